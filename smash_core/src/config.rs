// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loop configuration.

use core::time::Duration;

/// What an enqueue does when the dispatch queue is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backpressure {
    /// Fail immediately with [`DispatchError::Full`](crate::DispatchError::Full).
    Reject,
    /// Block the producer up to the given timeout, then fail with
    /// [`DispatchError::Full`](crate::DispatchError::Full).
    ///
    /// Producers on the loop thread never wait; they behave as [`Reject`].
    ///
    /// [`Reject`]: Backpressure::Reject
    Wait(Duration),
}

/// Configuration for a [`Reactor`](crate::reactor::Reactor).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopConfig {
    /// Dispatch queue capacity. Zero is promoted to one.
    pub dispatch_capacity: usize,
    /// Full-queue policy.
    pub backpressure: Backpressure,
    /// Target interval between animation frames.
    pub frame_interval: Duration,
}

impl LoopConfig {
    /// Default frame interval (about 60 Hz).
    pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

    /// Preset for protocol-client backends that own their wait.
    #[must_use]
    pub const fn protocol() -> Self {
        Self {
            dispatch_capacity: 5,
            backpressure: Backpressure::Wait(Duration::from_millis(50)),
            frame_interval: Self::DEFAULT_FRAME_INTERVAL,
        }
    }

    /// Preset for retained-toolkit backends driven by their own main loop.
    ///
    /// A single slot: the host's idle callback drains one task per wake-up.
    #[must_use]
    pub const fn toolkit() -> Self {
        Self {
            dispatch_capacity: 1,
            backpressure: Backpressure::Wait(Duration::from_millis(50)),
            frame_interval: Self::DEFAULT_FRAME_INTERVAL,
        }
    }

    /// Returns the capacity actually used by the queue.
    #[must_use]
    pub const fn effective_capacity(&self) -> usize {
        if self.dispatch_capacity == 0 {
            1
        } else {
            self.dispatch_capacity
        }
    }

    /// Returns a copy with a different frame interval.
    #[must_use]
    pub const fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Returns a copy with a different dispatch queue shape.
    #[must_use]
    pub const fn with_dispatch(mut self, capacity: usize, backpressure: Backpressure) -> Self {
        self.dispatch_capacity = capacity;
        self.backpressure = backpressure;
        self
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::protocol()
    }
}
