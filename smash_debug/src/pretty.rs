// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in milliseconds since the loop was created.

use std::io::Write;
use std::time::Duration;

use smash_core::trace::{
    AnomalyEvent, FrameEvent, NativeBatchEvent, QuitEvent, RedrawRequestEvent, RepaintEvent,
    ResizeEvent, TaskEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    repaints: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("repaints", &self.repaints)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            repaints: true,
        }
    }

    /// Skips the per-blit `[repaint]` lines, which dominate busy traces.
    #[must_use]
    pub fn without_repaints(mut self) -> Self {
        self.repaints = false;
        self
    }

    /// Returns the destination, consuming the sink.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn ms(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_native_batch(&mut self, e: &NativeBatchEvent) {
        let _ = writeln!(
            self.writer,
            "[native] at {:.3}ms events={}",
            ms(e.at),
            e.events,
        );
    }

    fn on_redraw_request(&mut self, e: &RedrawRequestEvent) {
        let state = if e.newly_wanted { "new" } else { "coalesced" };
        let _ = writeln!(self.writer, "[redraw] at {:.3}ms {state}", ms(e.at));
    }

    fn on_frame(&mut self, e: &FrameEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] #{} at {:.3}ms advanced={} finished={} remaining={} drew={}",
            e.frame_index,
            ms(e.at),
            e.advanced,
            e.finished,
            e.remaining,
            e.drew,
        );
    }

    fn on_task(&mut self, e: &TaskEvent) {
        let _ = writeln!(
            self.writer,
            "[task] #{} at {:.3}ms took {:.1}µs",
            e.task_index,
            ms(e.at),
            e.duration.as_nanos() as f64 / 1000.0,
        );
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        let realloc = if e.reallocated { " (reallocated)" } else { "" };
        let _ = writeln!(
            self.writer,
            "[resize] at {:.3}ms {}x{}{realloc}",
            ms(e.at),
            e.width,
            e.height,
        );
    }

    fn on_repaint(&mut self, e: &RepaintEvent) {
        if !self.repaints {
            return;
        }
        let r = e.rect;
        let _ = writeln!(
            self.writer,
            "[repaint] at {:.3}ms {}x{}+{}+{}",
            ms(e.at),
            r.width,
            r.height,
            r.x,
            r.y,
        );
    }

    fn on_anomaly(&mut self, e: &AnomalyEvent) {
        let _ = writeln!(self.writer, "[anomaly] at {:.3}ms {:?}", ms(e.at), e.kind);
    }

    fn on_quit(&mut self, e: &QuitEvent) {
        let _ = writeln!(
            self.writer,
            "[quit] at {:.3}ms discarded={}",
            ms(e.at),
            e.discarded_tasks,
        );
    }
}
