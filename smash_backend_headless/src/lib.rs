// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory backend for smash.
//!
//! Windows exist only as [`MemorySurface`]s and receive events through an
//! [`Injector`]. Both loop drivers are supported:
//!
//! - **Owned**: [`HeadlessPlatform::new`] returns the platform together with
//!   a [`ChannelReadiness`] for
//!   [`Reactor::run`](smash_core::reactor::Reactor::run).
//! - **Embedded**: [`HostLoop`] models a retained toolkit's main loop (event
//!   callbacks, idle queue, frame clock) and drives an
//!   [`Embedded`](smash_core::reactor::Embedded) reactor.
//!
//! ```
//! use smash_backend_headless::HostLoop;
//! use smash_core::event::NativeEvent;
//! # use smash_core::keys::Key;
//! # use smash_core::reactor::{WindowCx, WindowDelegate};
//! # use smash_core::render::Pixmap;
//! # struct App;
//! # impl WindowDelegate for App {
//! #     fn draw(&mut self, pixmap: &mut Pixmap) { pixmap.fill(0xff00_0000); }
//! #     fn key(&mut self, _: &mut WindowCx<'_>, _: Key) -> bool { false }
//! #     fn scroll(&mut self, _: &mut WindowCx<'_>, _: i32) {}
//! # }
//!
//! let mut host = HostLoop::new();
//! let mut window = host.embed(App, None);
//! let injector = window.reactor().platform().injector();
//! injector.send(NativeEvent::Configure { width: 80, height: 24 })?;
//! injector.send(NativeEvent::CloseRequested)?;
//! host.run(&mut window)?;
//! assert!(window.is_stopped());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod host;
mod platform;
mod surface;

pub use host::{HostLoop, HostStats};
pub use platform::{ChannelReadiness, HeadlessPlatform, Injector};
pub use surface::MemorySurface;
