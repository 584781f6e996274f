// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the event loop.
//!
//! This module provides a [`TraceSink`] trait with one method per unit of
//! loop work. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] owns an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing and installed sinks are
//! dropped immediately. When **on**, each method performs a single `Option`
//! branch before dispatching.
//!
//! Every event carries `at`, the time elapsed since the loop was created.

use core::time::Duration;

use crate::keys::Keysym;
use crate::render::Rect;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after a batch of native events has been dispatched.
#[derive(Clone, Copy, Debug)]
pub struct NativeBatchEvent {
    /// Time since loop creation.
    pub at: Duration,
    /// Number of native events in the batch.
    pub events: usize,
}

/// Emitted when a redraw request is folded into the loop state.
#[derive(Clone, Copy, Debug)]
pub struct RedrawRequestEvent {
    /// Time since loop creation.
    pub at: Duration,
    /// `false` if a draw was already pending and this request coalesced.
    pub newly_wanted: bool,
}

/// Emitted after a frame unit.
#[derive(Clone, Copy, Debug)]
pub struct FrameEvent {
    /// Time since loop creation.
    pub at: Duration,
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Animations advanced this frame.
    pub advanced: usize,
    /// Animations that finished this frame.
    pub finished: usize,
    /// Animations still active after the frame.
    pub remaining: usize,
    /// Whether the delegate drew.
    pub drew: bool,
}

/// Emitted after a dispatched task ran.
#[derive(Clone, Copy, Debug)]
pub struct TaskEvent {
    /// Time since loop creation.
    pub at: Duration,
    /// Monotonic task counter.
    pub task_index: u64,
    /// Time the task spent running.
    pub duration: Duration,
}

/// Emitted when the window was resized.
#[derive(Clone, Copy, Debug)]
pub struct ResizeEvent {
    /// Time since loop creation.
    pub at: Duration,
    /// New width.
    pub width: u32,
    /// New height.
    pub height: u32,
    /// Whether surfaces were reallocated.
    pub reallocated: bool,
}

/// Emitted for every blit from the backing store.
#[derive(Clone, Copy, Debug)]
pub struct RepaintEvent {
    /// Time since loop creation.
    pub at: Duration,
    /// The clipped rectangle that was copied.
    pub rect: Rect,
}

/// What kind of non-fatal oddity was seen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnomalyKind {
    /// A keysym with no abstract mapping.
    UnhandledKey(Keysym),
    /// A native event type the backend could not translate.
    UnknownEvent(u32),
    /// A pointer button with no binding.
    UnhandledButton(u32),
    /// A frame wanted to draw before the window had a size.
    SkippedFrame,
}

/// Emitted for anomalies that are logged but never fatal.
#[derive(Clone, Copy, Debug)]
pub struct AnomalyEvent {
    /// Time since loop creation.
    pub at: Duration,
    /// What happened.
    pub kind: AnomalyKind,
}

/// Emitted once when the loop stops.
#[derive(Clone, Copy, Debug)]
pub struct QuitEvent {
    /// Time since loop creation.
    pub at: Duration,
    /// Tasks that were still queued and got discarded.
    pub discarded_tasks: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the event loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a native batch.
    fn on_native_batch(&mut self, e: &NativeBatchEvent) {
        _ = e;
    }

    /// Called when a redraw request is consumed.
    fn on_redraw_request(&mut self, e: &RedrawRequestEvent) {
        _ = e;
    }

    /// Called after a frame.
    fn on_frame(&mut self, e: &FrameEvent) {
        _ = e;
    }

    /// Called after a dispatched task.
    fn on_task(&mut self, e: &TaskEvent) {
        _ = e;
    }

    /// Called after a resize.
    fn on_resize(&mut self, e: &ResizeEvent) {
        _ = e;
    }

    /// Called after each blit.
    fn on_repaint(&mut self, e: &RepaintEvent) {
        _ = e;
    }

    /// Called for each anomaly.
    fn on_anomaly(&mut self, e: &AnomalyEvent) {
        _ = e;
    }

    /// Called when the loop stops.
    fn on_quit(&mut self, e: &QuitEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Owner of an optional [`TraceSink`].
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::none()
    }
}

macro_rules! forward {
    ($(#[$doc:meta] $name:ident => $method:ident($ty:ty);)*) => {
        $(
            #[$doc]
            #[inline]
            pub fn $name(&mut self, e: &$ty) {
                #[cfg(feature = "trace")]
                if let Some(s) = &mut self.sink {
                    s.$method(e);
                }
                #[cfg(not(feature = "trace"))]
                {
                    _ = e;
                }
            }
        )*
    };
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            drop(sink);
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            #[cfg(feature = "trace")]
            sink: None,
        }
    }

    /// Replaces the sink, returning the previous one.
    pub fn replace(&mut self, sink: Option<Box<dyn TraceSink>>) -> Option<Box<dyn TraceSink>> {
        #[cfg(feature = "trace")]
        {
            core::mem::replace(&mut self.sink, sink)
        }
        #[cfg(not(feature = "trace"))]
        {
            drop(sink);
            None
        }
    }

    forward! {
        /// Emits a [`NativeBatchEvent`].
        native_batch => on_native_batch(NativeBatchEvent);
        /// Emits a [`RedrawRequestEvent`].
        redraw_request => on_redraw_request(RedrawRequestEvent);
        /// Emits a [`FrameEvent`].
        frame => on_frame(FrameEvent);
        /// Emits a [`TaskEvent`].
        task => on_task(TaskEvent);
        /// Emits a [`ResizeEvent`].
        resize => on_resize(ResizeEvent);
        /// Emits a [`RepaintEvent`].
        repaint => on_repaint(RepaintEvent);
        /// Emits an [`AnomalyEvent`].
        anomaly => on_anomaly(AnomalyEvent);
        /// Emits a [`QuitEvent`].
        quit => on_quit(QuitEvent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_tracer_accepts_events() {
        let mut tracer = Tracer::none();
        tracer.native_batch(&NativeBatchEvent {
            at: Duration::ZERO,
            events: 3,
        });
        tracer.quit(&QuitEvent {
            at: Duration::ZERO,
            discarded_tasks: 0,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn sink_receives_forwarded_events() {
        use std::sync::{Arc, Mutex};

        struct Count(Arc<Mutex<usize>>);
        impl TraceSink for Count {
            fn on_frame(&mut self, _: &FrameEvent) {
                *self.0.lock().unwrap() += 1;
            }
        }

        let count = Arc::new(Mutex::new(0));
        let mut tracer = Tracer::new(Box::new(Count(count.clone())));
        let e = FrameEvent {
            at: Duration::ZERO,
            frame_index: 0,
            advanced: 1,
            finished: 0,
            remaining: 1,
            drew: true,
        };
        tracer.frame(&e);
        tracer.frame(&e);
        assert_eq!(*count.lock().unwrap(), 2, "both frames should reach the sink");

        assert!(tracer.replace(None).is_some(), "old sink should be returned");
        tracer.frame(&e);
        assert_eq!(*count.lock().unwrap(), 2, "no sink, no events");
    }
}
