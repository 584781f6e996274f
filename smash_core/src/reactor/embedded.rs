// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Driver for hosts that run their own main loop.

use std::sync::Arc;
use std::time::Instant;

use super::{Reactor, WindowDelegate};
use crate::Error;
use crate::anim::Deadline;
use crate::backend::{Platform, Wake};
use crate::config::LoopConfig;
use crate::dispatch::LoopHandle;
use crate::event::NativeEvent;

/// A [`Reactor`] driven by callbacks from a host toolkit's main loop.
///
/// The host wires three of its primitives to this driver:
///
/// - its event callbacks call [`on_native`](Self::on_native) with translated
///   events;
/// - its frame clock calls [`on_frame`](Self::on_frame) while
///   [`next_deadline`](Self::next_deadline) is `Some`;
/// - its "run soon" primitive (idle callback) implements [`Wake`] and calls
///   [`on_wake`](Self::on_wake) once per wake-up.
///
/// Each callback runs at most one unit of loop work, so the ordering
/// guarantees match [`Reactor::run`].
#[derive(Debug)]
pub struct Embedded<P: Platform, D> {
    reactor: Reactor<P, D>,
}

impl<P: Platform, D: WindowDelegate + 'static> Embedded<P, D> {
    /// Creates the window state. `host` is notified of every wake-up.
    pub fn new(platform: P, delegate: D, config: LoopConfig, host: Arc<dyn Wake>) -> Self {
        Self {
            reactor: Reactor::build(platform, delegate, config, Some(host)),
        }
    }

    /// The wrapped reactor.
    #[must_use]
    pub fn reactor(&self) -> &Reactor<P, D> {
        &self.reactor
    }

    /// The wrapped reactor, mutably.
    pub fn reactor_mut(&mut self) -> &mut Reactor<P, D> {
        &mut self.reactor
    }

    /// Returns a handle for other threads.
    #[must_use]
    pub fn handle(&self) -> LoopHandle<D> {
        self.reactor.handle()
    }

    /// Dispatches a batch of native events delivered by the host.
    pub fn on_native(&mut self, events: &[NativeEvent]) -> Result<(), Error> {
        if self.check_quit() {
            return Ok(());
        }
        self.reactor.dispatch_native(events)
    }

    /// Runs a frame at `now`.
    ///
    /// Returns `true` while animations remain, so the host keeps its frame
    /// clock running.
    pub fn on_frame(&mut self, now: Instant) -> Result<bool, Error> {
        if self.check_quit() {
            return Ok(false);
        }
        self.reactor.frame(now)?;
        Ok(!self.reactor.animations().is_empty())
    }

    /// Runs the oldest pending wake-up unit.
    ///
    /// Returns `false` if nothing was pending.
    pub fn on_wake(&mut self) -> Result<bool, Error> {
        if self.check_quit() {
            return Ok(false);
        }
        let Some(signal) = self.reactor.try_signal() else {
            return Ok(false);
        };
        self.reactor.handle_signal(signal)?;
        Ok(true)
    }

    /// When the host should next call [`on_frame`](Self::on_frame).
    #[must_use]
    pub fn next_deadline(&self) -> Option<Deadline> {
        if self.reactor.is_stopped() {
            return None;
        }
        self.reactor.next_deadline()
    }

    /// Returns `true` once the loop has stopped; the host should leave its
    /// main loop.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.reactor.is_stopped()
    }

    /// Consumes the driver, returning the reactor.
    #[must_use]
    pub fn into_reactor(self) -> Reactor<P, D> {
        self.reactor
    }

    fn check_quit(&mut self) -> bool {
        if self.reactor.quit_requested() {
            self.reactor.stop();
        }
        self.reactor.is_stopped()
    }
}
