// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Windowing and event core for the smash shell.
//!
//! `smash_core` owns one native top-level window per loop instance and turns
//! four kinds of input into a single, strictly sequential stream of work:
//! native platform events, explicit redraw requests, animation frame
//! deadlines, and closures submitted from other threads.
//!
//! # Architecture
//!
//! ```text
//!   Backend (native events)     LoopHandle (any thread)
//!       │                           │ enqueue / mark_dirty / quit
//!       ▼                           ▼
//!   Readiness ──► Signal ──►  Reactor  ◄── Animations::next_deadline()
//!                               │
//!           ┌───────────────────┼────────────────────┐
//!           ▼                   ▼                    ▼
//!   keys::decode_*()     WindowDelegate::draw   DoubleBuffer::repaint
//!           │                   │                    │
//!           ▼                   ▼                    ▼
//!   delegate.key()      backing Pixmap  ──blit──► Onscreen surface
//! ```
//!
//! **[`keys`]**: Maps native keysyms and lookup text to abstract
//! [`Key`](keys::Key) values, filtering pure-modifier presses.
//!
//! **[`anim`]**: The per-window active animation set and the next frame
//! deadline computation.
//!
//! **[`render`]**: Off-screen [`Pixmap`](render::Pixmap) backing store,
//! integer damage rectangles, and the [`DoubleBuffer`](render::DoubleBuffer)
//! state machine.
//!
//! **[`dispatch`]**: Bounded cross-thread task relay and the cloneable
//! [`LoopHandle`](dispatch::LoopHandle).
//!
//! **[`reactor`]**: The loop itself, with an owned driver
//! ([`Reactor::run`](reactor::Reactor::run)) for backends whose native wait
//! this crate controls, and an [`Embedded`](reactor::Embedded) driver for
//! backends whose toolkit runs its own main loop.
//!
//! **[`backend`]**: The primitives a platform backend must provide.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! loop instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

pub mod anim;
pub mod backend;
pub mod config;
pub mod dispatch;
mod error;
pub mod event;
pub mod keys;
pub mod reactor;
pub mod render;
pub mod trace;

pub use error::{DispatchError, Error};

#[cfg(test)]
pub(crate) mod testing;
