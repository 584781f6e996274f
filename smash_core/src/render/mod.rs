// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Double-buffered rendering.
//!
//! The delegate always draws into an off-screen [`Pixmap`] (the backing
//! store, the source of truth for pixel content). The visible surface is
//! only ever updated by copying regions of the backing store onto it with
//! source-replace compositing. This lets exposure and damage be repaired
//! without re-running the delegate's drawing logic.
//!
//! - [`Pixmap`]: 32-bit ARGB off-screen buffer.
//! - [`Rect`]: integer damage rectangle; [`Damage`] accumulates them.
//! - [`DoubleBuffer`]: the per-window surface pair and its state machine.
//! - [`DirtyFlag`]: coalescing "a redraw is wanted" flag.

mod damage;
mod dirty;
mod double_buffer;
mod pixmap;

pub use damage::{Damage, Rect};
pub use dirty::DirtyFlag;
pub use double_buffer::{DoubleBuffer, RenderState, Resized};
pub use pixmap::Pixmap;
