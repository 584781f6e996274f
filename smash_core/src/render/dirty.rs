// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::atomic::{AtomicBool, Ordering};

/// Coalescing "redraw wanted" flag, settable from any thread.
///
/// Only the call that moves the flag from clean to dirty reports `true`, so
/// any number of marks before the loop consumes the flag cost one wake-up and
/// one draw.
#[derive(Debug, Default)]
pub struct DirtyFlag {
    dirty: AtomicBool,
}

impl DirtyFlag {
    /// Creates a clean flag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dirty: AtomicBool::new(false),
        }
    }

    /// Marks the flag. Returns `true` if it was clean before this call.
    pub fn mark(&self) -> bool {
        !self.dirty.swap(true, Ordering::AcqRel)
    }

    /// Consumes the flag, returning whether it was dirty.
    pub fn take(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    /// Returns whether the flag is currently dirty.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }
}
