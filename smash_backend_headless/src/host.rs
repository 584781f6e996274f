// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A simulated retained-toolkit main loop.
//!
//! Retained toolkits own the process's main loop. They deliver window
//! events through callbacks, run "idle" callbacks queued from any thread,
//! and tick a frame clock while something is animating. [`HostLoop`] is a
//! small model of such a loop, used to drive an [`Embedded`] reactor:
//!
//! ```text
//!   Injector::send ─┐
//!                   ├─► main queue (FIFO) ──► Native: drain + Embedded::on_native
//!   IdleWake::wake ─┘                    └──► other: Embedded::on_wake
//!
//!   frame clock: Embedded::next_deadline() due ──► Embedded::on_frame
//! ```
//!
//! Native events and idle callbacks share one FIFO, so a task queued before
//! an event runs before it, as in the owned loop.

use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use smash_core::Error;
use smash_core::anim::Deadline;
use smash_core::backend::{Platform, Signal, Wake};
use smash_core::config::LoopConfig;
use smash_core::event::NativeEvent;
use smash_core::reactor::{Embedded, WindowDelegate};

use crate::platform::HeadlessPlatform;

/// Counts of the callbacks a [`HostLoop`] delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostStats {
    /// Non-empty native event batches.
    pub batches: u64,
    /// Idle callbacks.
    pub idles: u64,
    /// Frame clock ticks.
    pub frames: u64,
}

/// The host's "run soon" primitive: queues an idle callback.
#[derive(Debug)]
struct IdleWake(Sender<Signal>);

impl Wake for IdleWake {
    fn wake(&self, signal: Signal) {
        // The host owns a sender, so the queue outlives every waker.
        _ = self.0.send(signal);
    }
}

/// A single-threaded toolkit main loop.
#[derive(Debug)]
pub struct HostLoop {
    main_tx: Sender<Signal>,
    main_rx: Receiver<Signal>,
    batch: Vec<NativeEvent>,
    stats: HostStats,
}

impl Default for HostLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl HostLoop {
    /// Creates an idle host.
    #[must_use]
    pub fn new() -> Self {
        let (main_tx, main_rx) = crossbeam_channel::unbounded();
        Self {
            main_tx,
            main_rx,
            batch: Vec::new(),
            stats: HostStats::default(),
        }
    }

    /// Creates a window whose events are delivered by this host.
    #[must_use]
    pub fn platform(&self) -> HeadlessPlatform {
        HeadlessPlatform::with_notifier(self.main_tx.clone())
    }

    /// Returns the wake-up primitive to hand to [`Embedded::new`].
    #[must_use]
    pub fn waker(&self) -> Arc<dyn Wake> {
        Arc::new(IdleWake(self.main_tx.clone()))
    }

    /// Creates a window on this host and embeds a reactor for it.
    ///
    /// Uses [`LoopConfig::toolkit`] unless `config` says otherwise.
    pub fn embed<D: WindowDelegate + 'static>(
        &self,
        delegate: D,
        config: Option<LoopConfig>,
    ) -> Embedded<HeadlessPlatform, D> {
        Embedded::new(
            self.platform(),
            delegate,
            config.unwrap_or_else(LoopConfig::toolkit),
            self.waker(),
        )
    }

    /// Callback counts so far.
    #[must_use]
    pub fn stats(&self) -> HostStats {
        self.stats
    }

    /// Runs every queued callback, then the frame clock if it is due at
    /// `now`. Never blocks.
    ///
    /// Returns the number of callbacks delivered.
    pub fn dispatch_pending<P, D>(
        &mut self,
        embedded: &mut Embedded<P, D>,
        now: Instant,
    ) -> Result<usize, Error>
    where
        P: Platform,
        D: WindowDelegate + 'static,
    {
        let mut delivered = 0;
        while !embedded.is_stopped() {
            let Ok(signal) = self.main_rx.try_recv() else {
                break;
            };
            self.deliver(embedded, signal)?;
            delivered += 1;
        }
        if embedded.next_deadline().is_some_and(|d| d.is_due(now)) {
            self.tick(embedded, now)?;
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Runs until the embedded reactor stops.
    pub fn run<P, D>(&mut self, embedded: &mut Embedded<P, D>) -> Result<(), Error>
    where
        P: Platform,
        D: WindowDelegate + 'static,
    {
        log::debug!("host loop started");
        // Toolkits interleave frame clock ticks with idle callbacks; after a
        // tick, one queued callback goes first even if the clock is due again.
        let mut after_tick = false;
        while !embedded.is_stopped() {
            let now = Instant::now();
            let deadline = embedded.next_deadline();
            if deadline.is_some_and(|d| d.is_due(now)) {
                let pending = if after_tick {
                    self.main_rx.try_recv().ok()
                } else {
                    None
                };
                match pending {
                    Some(signal) => {
                        after_tick = false;
                        self.deliver(embedded, signal)?;
                    }
                    None => {
                        after_tick = true;
                        self.tick(embedded, now)?;
                    }
                }
                continue;
            }
            let signal = match deadline {
                Some(Deadline::At(at)) => match self.main_rx.recv_deadline(at) {
                    Ok(signal) => signal,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => return Err(closed()),
                },
                _ => self.main_rx.recv().map_err(|_| closed())?,
            };
            after_tick = false;
            self.deliver(embedded, signal)?;
        }
        log::debug!("host loop finished: {:?}", self.stats);
        Ok(())
    }

    fn deliver<P, D>(&mut self, embedded: &mut Embedded<P, D>, signal: Signal) -> Result<(), Error>
    where
        P: Platform,
        D: WindowDelegate + 'static,
    {
        match signal {
            Signal::Native => {
                let mut batch = core::mem::take(&mut self.batch);
                batch.clear();
                embedded
                    .reactor_mut()
                    .platform_mut()
                    .drain_events(&mut batch)?;
                // Earlier tokens may already have drained this batch.
                let result = if batch.is_empty() {
                    Ok(())
                } else {
                    self.stats.batches += 1;
                    embedded.on_native(&batch)
                };
                self.batch = batch;
                result
            }
            Signal::Redraw | Signal::Dispatch | Signal::Quit => {
                self.stats.idles += 1;
                embedded.on_wake().map(drop)
            }
        }
    }

    fn tick<P, D>(&mut self, embedded: &mut Embedded<P, D>, now: Instant) -> Result<(), Error>
    where
        P: Platform,
        D: WindowDelegate + 'static,
    {
        self.stats.frames += 1;
        embedded.on_frame(now).map(drop)
    }
}

fn closed() -> Error {
    Error::InvalidState("host main queue closed")
}
