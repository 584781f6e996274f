// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-thread relay into the loop.
//!
//! Other threads never touch the window. They hold a [`LoopHandle`] and use
//! it to enqueue closures, request a redraw, or request quit. Each of those
//! posts a [`Signal`] to the loop so that it wakes up even while it is
//! blocked on native input.
//!
//! Tasks go through a bounded `crossbeam-channel` queue. The loop thread is
//! the only consumer and runs tasks one at a time in FIFO order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ThreadId};

use crossbeam_channel::{Receiver, SendTimeoutError, Sender, TrySendError};

use crate::DispatchError;
use crate::backend::{Signal, Wake};
use crate::config::{Backpressure, LoopConfig};
use crate::reactor::WindowCx;
use crate::render::DirtyFlag;

/// A closure that runs on the loop thread with the delegate and window.
pub type Task<D> = Box<dyn FnOnce(&mut D, &mut WindowCx<'_>) + Send>;

/// State shared between the loop and every [`LoopHandle`].
pub(crate) struct Shared {
    dirty: DirtyFlag,
    quit: AtomicBool,
    signals: Sender<Signal>,
    notify: Option<Arc<dyn Wake>>,
    loop_thread: ThreadId,
}

impl Shared {
    pub(crate) fn new(signals: Sender<Signal>, notify: Option<Arc<dyn Wake>>) -> Self {
        Self {
            dirty: DirtyFlag::new(),
            quit: AtomicBool::new(false),
            signals,
            notify,
            loop_thread: thread::current().id(),
        }
    }

    fn wake(&self, signal: Signal) {
        // The receiver only goes away with the loop, after which nobody
        // needs waking.
        _ = self.signals.send(signal);
        if let Some(notify) = &self.notify {
            notify.wake(signal);
        }
    }

    pub(crate) fn mark_dirty(&self) {
        if self.dirty.mark() {
            self.wake(Signal::Redraw);
        }
    }

    pub(crate) fn take_dirty(&self) -> bool {
        self.dirty.take()
    }

    /// Sets the quit flag. Only the first call wakes the loop.
    pub(crate) fn request_quit(&self) -> bool {
        let first = !self.quit.swap(true, Ordering::AcqRel);
        if first {
            self.wake(Signal::Quit);
        }
        first
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    pub(crate) fn signals(&self) -> Sender<Signal> {
        self.signals.clone()
    }

    fn on_loop_thread(&self) -> bool {
        thread::current().id() == self.loop_thread
    }
}

/// Cloneable, thread-safe handle to a running loop.
pub struct LoopHandle<D> {
    shared: Arc<Shared>,
    tasks: Sender<Task<D>>,
    backpressure: Backpressure,
}

impl<D> Clone for LoopHandle<D> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            tasks: self.tasks.clone(),
            backpressure: self.backpressure,
        }
    }
}

impl<D> core::fmt::Debug for LoopHandle<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoopHandle")
            .field("queued", &self.tasks.len())
            .field("backpressure", &self.backpressure)
            .field("quitting", &self.shared.quit_requested())
            .finish()
    }
}

impl<D: 'static> LoopHandle<D> {
    /// Queues `task` to run on the loop thread.
    ///
    /// Fails with [`DispatchError::Closed`] once quit was requested, and with
    /// [`DispatchError::Full`] when the queue stays full past the configured
    /// [`Backpressure`]. Calls made on the loop thread itself never wait.
    pub fn enqueue<F>(&self, task: F) -> Result<(), DispatchError>
    where
        F: FnOnce(&mut D, &mut WindowCx<'_>) + Send + 'static,
    {
        if self.shared.quit_requested() {
            return Err(DispatchError::Closed);
        }
        let task: Task<D> = Box::new(task);
        match self.backpressure {
            Backpressure::Wait(timeout) if !self.shared.on_loop_thread() => {
                self.tasks.send_timeout(task, timeout).map_err(|e| match e {
                    SendTimeoutError::Timeout(_) => DispatchError::Full,
                    SendTimeoutError::Disconnected(_) => DispatchError::Closed,
                })?;
            }
            _ => {
                self.tasks.try_send(task).map_err(|e| match e {
                    TrySendError::Full(_) => DispatchError::Full,
                    TrySendError::Disconnected(_) => DispatchError::Closed,
                })?;
            }
        }
        self.shared.wake(Signal::Dispatch);
        Ok(())
    }

    /// Requests a redraw. Calls before the loop gets to it coalesce.
    pub fn mark_dirty(&self) {
        self.shared.mark_dirty();
    }

    /// Requests the loop to stop. Idempotent and non-blocking.
    pub fn quit(&self) {
        self.shared.request_quit();
    }

    /// Returns `true` once quit was requested.
    #[must_use]
    pub fn is_quitting(&self) -> bool {
        self.shared.quit_requested()
    }
}

/// Loop-side end of the task queue.
pub(crate) struct Dispatcher<D> {
    shared: Arc<Shared>,
    tx: Sender<Task<D>>,
    rx: Receiver<Task<D>>,
    backpressure: Backpressure,
}

impl<D: 'static> Dispatcher<D> {
    pub(crate) fn new(config: &LoopConfig, shared: Arc<Shared>) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(config.effective_capacity());
        Self {
            shared,
            tx,
            rx,
            backpressure: config.backpressure,
        }
    }

    pub(crate) fn shared(&self) -> &Shared {
        &self.shared
    }

    pub(crate) fn handle(&self) -> LoopHandle<D> {
        LoopHandle {
            shared: self.shared.clone(),
            tasks: self.tx.clone(),
            backpressure: self.backpressure,
        }
    }

    /// Takes the oldest task, if any.
    pub(crate) fn pop(&self) -> Option<Task<D>> {
        self.rx.try_recv().ok()
    }

    /// Drops every queued task and returns how many there were.
    pub(crate) fn discard(&self) -> usize {
        self.rx.try_iter().count()
    }
}
