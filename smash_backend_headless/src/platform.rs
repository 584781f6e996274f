// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A window that exists only in memory.

use std::io;

use crossbeam_channel::{Receiver, Sender};
use smash_core::backend::{NativeWindow, Platform, Readiness, Signal};
use smash_core::event::NativeEvent;
use smash_core::{DispatchError, Error};

use crate::surface::MemorySurface;

/// Feeds native events to a [`HeadlessPlatform`] from any thread.
///
/// Each send also posts [`Signal::Native`] to whatever waits on the
/// platform: the [`ChannelReadiness`] of an owned loop, or a
/// [`HostLoop`](crate::HostLoop).
#[derive(Clone, Debug)]
pub struct Injector {
    events: Sender<NativeEvent>,
    ready: Sender<Signal>,
}

impl Injector {
    /// Queues one event.
    ///
    /// Fails with [`DispatchError::Closed`] once the platform is gone.
    pub fn send(&self, event: NativeEvent) -> Result<(), DispatchError> {
        self.events.send(event).map_err(|_| DispatchError::Closed)?;
        self.ready
            .send(Signal::Native)
            .map_err(|_| DispatchError::Closed)
    }

    /// Queues several events, delivered as one batch if nothing drains in
    /// between.
    pub fn send_all(
        &self,
        events: impl IntoIterator<Item = NativeEvent>,
    ) -> Result<(), DispatchError> {
        for event in events {
            self.events.send(event).map_err(|_| DispatchError::Closed)?;
        }
        self.ready
            .send(Signal::Native)
            .map_err(|_| DispatchError::Closed)
    }
}

/// Readiness for [`Reactor::run`](smash_core::reactor::Reactor::run): fires
/// once per injection.
#[derive(Debug)]
pub struct ChannelReadiness(Receiver<Signal>);

impl Readiness for ChannelReadiness {
    fn wait(&mut self) -> io::Result<()> {
        self.0
            .recv()
            .map(drop)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "all injectors dropped"))
    }
}

/// A [`Platform`] with [`MemorySurface`]s and injected events.
///
/// Window requests are recorded. [`set_size`](NativeWindow::set_size) is
/// honored the way a window manager would: a configure for the new size is
/// queued.
#[derive(Debug)]
pub struct HeadlessPlatform {
    events: Receiver<NativeEvent>,
    injector: Injector,
    position: (i32, i32),
    size_requests: Vec<(u32, u32)>,
    shown: bool,
    closed: bool,
    frame_requests: usize,
    surfaces_created: usize,
    fail_next_surface: bool,
}

impl HeadlessPlatform {
    /// Creates a platform for the owned loop, with its readiness source.
    #[must_use]
    pub fn new() -> (Self, ChannelReadiness) {
        let (ready_tx, ready_rx) = crossbeam_channel::unbounded();
        (Self::with_notifier(ready_tx), ChannelReadiness(ready_rx))
    }

    /// Creates a platform whose injections post to `ready`.
    pub(crate) fn with_notifier(ready: Sender<Signal>) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        Self {
            events: events_rx,
            injector: Injector {
                events: events_tx,
                ready,
            },
            position: (0, 0),
            size_requests: Vec::new(),
            shown: false,
            closed: false,
            frame_requests: 0,
            surfaces_created: 0,
            fail_next_surface: false,
        }
    }

    /// Returns an injector for this window.
    #[must_use]
    pub fn injector(&self) -> Injector {
        self.injector.clone()
    }

    /// Sizes passed to [`set_size`](NativeWindow::set_size), oldest first.
    #[must_use]
    pub fn size_requests(&self) -> &[(u32, u32)] {
        &self.size_requests
    }

    /// Returns `true` once [`show`](NativeWindow::show) was called.
    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Returns `true` once [`close`](NativeWindow::close) was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// How often the loop armed the frame callback.
    #[must_use]
    pub fn frame_requests(&self) -> usize {
        self.frame_requests
    }

    /// How many on-screen surfaces were allocated.
    #[must_use]
    pub fn surfaces_created(&self) -> usize {
        self.surfaces_created
    }

    /// Makes the next surface allocation fail.
    pub fn fail_next_surface(&mut self) {
        self.fail_next_surface = true;
    }
}

impl NativeWindow for HeadlessPlatform {
    fn set_size(&mut self, width: u32, height: u32) {
        self.size_requests.push((width, height));
        if self
            .injector
            .send(NativeEvent::Configure { width, height })
            .is_err()
        {
            log::debug!("size request {width}x{height} after the event source closed");
        }
    }

    fn set_position(&mut self, x: i32, y: i32) {
        self.position = (x, y);
    }

    fn content_position(&self) -> (i32, i32) {
        self.position
    }

    fn show(&mut self) {
        self.shown = true;
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

impl Platform for HeadlessPlatform {
    type Onscreen = MemorySurface;

    fn create_onscreen(&mut self, width: u32, height: u32) -> Result<MemorySurface, Error> {
        if core::mem::take(&mut self.fail_next_surface) {
            return Err(Error::SurfaceCreation {
                width,
                height,
                reason: "injected failure".into(),
            });
        }
        let surface = MemorySurface::new(width, height)?;
        self.surfaces_created += 1;
        Ok(surface)
    }

    fn drain_events(&mut self, out: &mut Vec<NativeEvent>) -> Result<(), Error> {
        out.extend(self.events.try_iter());
        Ok(())
    }

    fn request_frames(&mut self) {
        self.frame_requests += 1;
    }
}
