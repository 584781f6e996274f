// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wayland backend for smash.
//!
//! Speaks the protocol directly: one xdg-shell toplevel, a single `wl_shm`
//! buffer as the on-screen surface, and keyboard and pointer input from the
//! first seat. The backend owns its event queue, so it is driven by the
//! owned loop:
//!
//! ```no_run
//! # use smash_core::reactor::{Reactor, WindowDelegate, WindowCx};
//! # use smash_core::render::Pixmap;
//! # use smash_core::keys::Key;
//! # struct App;
//! # impl WindowDelegate for App {
//! #     fn draw(&mut self, pixmap: &mut Pixmap) { pixmap.fill(0xff00_0000); }
//! #     fn key(&mut self, _: &mut WindowCx<'_>, _: Key) -> bool { false }
//! #     fn scroll(&mut self, _: &mut WindowCx<'_>, _: i32) {}
//! # }
//! use smash_backend_wayland::{WaylandConfig, WaylandPlatform};
//! use smash_core::config::LoopConfig;
//!
//! let (platform, readiness) = WaylandPlatform::connect(WaylandConfig::default())?;
//! let mut reactor = Reactor::new(platform, App, LoopConfig::protocol());
//! reactor.run(readiness)?;
//! # Ok::<(), smash_core::Error>(())
//! ```
//!
//! Key codes are translated with a built-in US layout; the compositor's xkb
//! keymap is not consulted.

mod keymap;
mod platform;
mod readiness;
mod shm;
mod state;

pub use platform::{WaylandConfig, WaylandPlatform};
pub use readiness::FdReadiness;
pub use shm::ShmSurface;
