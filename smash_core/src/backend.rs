// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! Smash splits native work into *backend* crates. Each backend provides the
//! following pieces:
//!
//! - **Window primitives**: [`NativeWindow`]: size, position, visibility.
//!
//! - **Surfaces**: [`Platform::create_onscreen`] allocates the visible
//!   surface for a given size. The returned [`Onscreen`] copies regions of
//!   the off-screen [`Pixmap`] onto itself and presents them. Dropping it
//!   destroys the native surface.
//!
//! - **Events**: [`Platform::drain_events`] translates everything the native
//!   layer has queued into [`NativeEvent`] values without blocking.
//!
//! - **Readiness**: A [`Readiness`] source blocks a background thread until
//!   the native layer may have events. Only needed by the owned driver
//!   ([`Reactor::run`](crate::reactor::Reactor::run)).
//!
//! - **Wake-up**: [`Wake`] lets other threads nudge the loop. The owned
//!   driver implements it with its own signal channel; toolkit backends
//!   implement it with their "run soon" primitive.
//!
//! # Crate boundaries
//!
//! `smash_core` owns sequencing, key normalization, animation scheduling and
//! the double-buffer state machine. Backend crates depend on `smash_core` and
//! provide native glue. Application code depends on both and hands the
//! backend's platform to a [`Reactor`](crate::reactor::Reactor).

use std::io;

use crate::Error;
use crate::event::NativeEvent;
use crate::render::{Pixmap, Rect};

/// Window-level native primitives.
pub trait NativeWindow {
    /// Requests a new content size. The native layer confirms with a
    /// [`NativeEvent::Configure`].
    fn set_size(&mut self, width: u32, height: u32);

    /// Moves the window.
    fn set_position(&mut self, x: i32, y: i32);

    /// Returns the position of the window's content area on screen.
    fn content_position(&self) -> (i32, i32);

    /// Makes the window visible.
    fn show(&mut self);

    /// Destroys the native window.
    fn close(&mut self);
}

/// The visible native surface of a window.
pub trait Onscreen {
    /// Returns the surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Replaces the pixels of `rect` with the same region of `src` and
    /// presents the result.
    ///
    /// `rect` is already clipped to the surface bounds and `src` has the same
    /// dimensions as this surface.
    fn blit(&mut self, src: &Pixmap, rect: Rect) -> Result<(), Error>;
}

/// Everything the reactor needs from a native layer.
pub trait Platform: NativeWindow {
    /// The on-screen surface type.
    type Onscreen: Onscreen;

    /// Allocates an on-screen surface of the given size.
    fn create_onscreen(&mut self, width: u32, height: u32) -> Result<Self::Onscreen, Error>;

    /// Moves every event the native layer has ready into `out`.
    ///
    /// Must not block. An error means the native connection is unusable.
    fn drain_events(&mut self, out: &mut Vec<NativeEvent>) -> Result<(), Error>;

    /// Arms the native per-frame callback, if the platform has one.
    ///
    /// Called once each time the animation set goes from empty to non-empty.
    fn request_frames(&mut self) {}

    /// Pushes buffered requests to the native layer.
    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// Blocks until a native event source may have something to read.
///
/// Called from a dedicated background thread, never from the loop thread.
pub trait Readiness: Send + 'static {
    /// Waits for readiness. Returning an error ends the readiness thread; the
    /// loop then finds out about the failure from
    /// [`Platform::drain_events`].
    fn wait(&mut self) -> io::Result<()>;
}

/// Why the loop is being woken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Native events may be ready.
    Native,
    /// A redraw was requested with [`mark_dirty`](crate::dispatch::LoopHandle::mark_dirty).
    Redraw,
    /// One task was enqueued.
    Dispatch,
    /// Quit was requested.
    Quit,
}

/// A thread-safe wake-up primitive for the loop.
pub trait Wake: Send + Sync {
    /// Wakes the loop for the given reason.
    fn wake(&self, signal: Signal);
}
