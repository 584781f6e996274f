// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The xdg-shell toplevel window.

use std::io;

use smash_core::Error;
use smash_core::backend::{NativeWindow, Platform};
use smash_core::event::NativeEvent;
use wayland_client::backend::WaylandError;
use wayland_client::globals::registry_queue_init;
use wayland_client::protocol::{wl_compositor, wl_seat, wl_shm, wl_surface};
use wayland_client::{Connection, EventQueue, QueueHandle};
use wayland_protocols::xdg::shell::client::{xdg_surface, xdg_toplevel, xdg_wm_base};

use crate::readiness::FdReadiness;
use crate::shm::ShmSurface;
use crate::state::WaylandState;

/// Window settings applied at connect time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaylandConfig {
    /// Toplevel title.
    pub title: String,
    /// Application id, used by compositors to match desktop entries.
    pub app_id: String,
    /// Width used when the compositor leaves the choice to the client.
    pub width: u32,
    /// Height used when the compositor leaves the choice to the client.
    pub height: u32,
}

impl Default for WaylandConfig {
    fn default() -> Self {
        Self {
            title: "smash".into(),
            app_id: "smash".into(),
            width: 640,
            height: 400,
        }
    }
}

/// One top-level window on a Wayland compositor.
///
/// Owns the connection's event queue and all protocol objects. Create it
/// with [`connect`](Self::connect), which also returns the readiness source
/// for [`Reactor::run`](smash_core::reactor::Reactor::run).
#[derive(Debug)]
pub struct WaylandPlatform {
    conn: Connection,
    queue: EventQueue<WaylandState>,
    qh: QueueHandle<WaylandState>,
    state: WaylandState,
    shm: wl_shm::WlShm,
    _wm_base: xdg_wm_base::XdgWmBase,
    _seat: Option<wl_seat::WlSeat>,
    surface: wl_surface::WlSurface,
    xdg_surface: xdg_surface::XdgSurface,
    toplevel: xdg_toplevel::XdgToplevel,
    closed: bool,
}

impl WaylandPlatform {
    /// Connects to the compositor named by the environment and creates the
    /// toplevel.
    ///
    /// Blocks for one roundtrip so the initial configure is queued by the
    /// time the loop starts.
    pub fn connect(config: WaylandConfig) -> Result<(Self, FdReadiness), Error> {
        let conn = Connection::connect_to_env().map_err(Error::backend)?;
        let (globals, mut queue) =
            registry_queue_init::<WaylandState>(&conn).map_err(Error::backend)?;
        let qh = queue.handle();

        let compositor: wl_compositor::WlCompositor =
            globals.bind(&qh, 4..=6, ()).map_err(Error::backend)?;
        let shm: wl_shm::WlShm = globals.bind(&qh, 1..=1, ()).map_err(Error::backend)?;
        let wm_base: xdg_wm_base::XdgWmBase =
            globals.bind(&qh, 1..=6, ()).map_err(Error::backend)?;
        let seat: Option<wl_seat::WlSeat> = match globals.bind(&qh, 1..=5, ()) {
            Ok(seat) => Some(seat),
            Err(err) => {
                log::warn!("no input seat: {err}");
                None
            }
        };

        let surface = compositor.create_surface(&qh, ());
        let xdg_surface = wm_base.get_xdg_surface(&surface, &qh, ());
        let toplevel = xdg_surface.get_toplevel(&qh, ());
        toplevel.set_title(config.title);
        toplevel.set_app_id(config.app_id);
        surface.commit();

        let mut state = WaylandState::new((config.width, config.height));
        queue.roundtrip(&mut state).map_err(Error::backend)?;
        let readiness = FdReadiness::new(&conn)?;
        log::info!("connected to wayland compositor");

        Ok((
            Self {
                conn,
                queue,
                qh,
                state,
                shm,
                _wm_base: wm_base,
                _seat: seat,
                surface,
                xdg_surface,
                toplevel,
                closed: false,
            },
            readiness,
        ))
    }

    /// Wakes the readiness thread by asking the compositor for a reply.
    fn nudge(&self) {
        self.conn.display().sync(&self.qh, ());
        if let Err(err) = self.conn.flush() {
            log::warn!("flush after sync failed: {err}");
        }
    }
}

impl NativeWindow for WaylandPlatform {
    fn set_size(&mut self, width: u32, height: u32) {
        // Toplevels pick their own size; report it as if configured.
        self.state.resize_to(width, height);
        self.nudge();
    }

    fn set_position(&mut self, x: i32, y: i32) {
        log::debug!("ignoring position request ({x}, {y}): not supported by xdg-shell");
    }

    fn content_position(&self) -> (i32, i32) {
        (0, 0)
    }

    fn show(&mut self) {
        self.surface.commit();
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.toplevel.destroy();
        self.xdg_surface.destroy();
        self.surface.destroy();
        if let Err(err) = self.conn.flush() {
            log::warn!("flush after close failed: {err}");
        }
    }
}

impl Platform for WaylandPlatform {
    type Onscreen = ShmSurface;

    fn create_onscreen(&mut self, width: u32, height: u32) -> Result<ShmSurface, Error> {
        ShmSurface::new(&self.shm, &self.surface, &self.qh, width, height)
    }

    fn drain_events(&mut self, out: &mut Vec<NativeEvent>) -> Result<(), Error> {
        self.queue.flush().map_err(Error::backend)?;
        if let Some(guard) = self.queue.prepare_read() {
            match guard.read() {
                Ok(_) => {}
                Err(WaylandError::Io(err)) if err.kind() == io::ErrorKind::WouldBlock => {}
                Err(err) => return Err(Error::backend(err)),
            }
        }
        self.queue
            .dispatch_pending(&mut self.state)
            .map_err(Error::backend)?;
        out.append(&mut self.state.events);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.conn.flush().map_err(Error::backend)
    }
}
