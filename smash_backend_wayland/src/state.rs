// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Protocol state and event translation.
//!
//! All backend objects are created with `QueueHandle<WaylandState>` and are
//! dispatched by the queue owned by [`WaylandPlatform`](crate::WaylandPlatform).
//! Handlers only translate; translated events accumulate in
//! [`WaylandState::events`] until the next drain.

use smash_core::event::{NativeEvent, RawKey};
use wayland_client::globals::GlobalListContents;
use wayland_client::protocol::{
    wl_buffer, wl_callback, wl_compositor, wl_keyboard, wl_pointer, wl_registry, wl_seat, wl_shm,
    wl_shm_pool, wl_surface,
};
use wayland_client::{Connection, Dispatch, QueueHandle, WEnum, delegate_noop};
use wayland_protocols::xdg::shell::client::{xdg_surface, xdg_toplevel, xdg_wm_base};

use crate::keymap::Keymap;

// Linux input event codes for pointer buttons.
const BTN_LEFT: u32 = 0x110;
const BTN_RIGHT: u32 = 0x111;
const BTN_MIDDLE: u32 = 0x112;
const BTN_SIDE: u32 = 0x113;
const BTN_EXTRA: u32 = 0x114;

/// Axis units per scrolled line.
const AXIS_PER_LINE: f64 = 10.0;

/// Backend-owned state for protocol handling.
#[derive(Debug)]
pub(crate) struct WaylandState {
    /// Translated events waiting for the next drain.
    pub(crate) events: Vec<NativeEvent>,
    keymap: Keymap,
    default_size: (u32, u32),
    /// Size suggested by the last toplevel configure; zero means "pick".
    suggested: (u32, u32),
    current: Option<(u32, u32)>,
    mapped: bool,
    scroll: f64,
    keyboard: Option<wl_keyboard::WlKeyboard>,
    pointer: Option<wl_pointer::WlPointer>,
}

impl WaylandState {
    pub(crate) fn new(default_size: (u32, u32)) -> Self {
        Self {
            events: Vec::new(),
            keymap: Keymap::default(),
            default_size,
            suggested: (0, 0),
            current: None,
            mapped: false,
            scroll: 0.0,
            keyboard: None,
            pointer: None,
        }
    }

    /// Records a client-chosen size and reports it as a configure.
    pub(crate) fn resize_to(&mut self, width: u32, height: u32) {
        self.default_size = (width, height);
        self.current = Some((width, height));
        self.events.push(NativeEvent::Configure { width, height });
    }

    fn configured(&mut self) {
        let (width, height) = match self.suggested {
            (0, _) | (_, 0) => self.current.unwrap_or(self.default_size),
            size => size,
        };
        self.current = Some((width, height));
        self.events.push(NativeEvent::Configure { width, height });
        if !self.mapped {
            self.mapped = true;
            self.events.push(NativeEvent::Mapped);
        }
    }

    fn scrolled(&mut self, value: f64) {
        self.scroll += value / AXIS_PER_LINE;
        let lines = self.scroll.trunc();
        if lines != 0.0 {
            self.scroll -= lines;
            #[expect(
                clippy::cast_possible_truncation,
                reason = "one axis event never scrolls more than i32::MAX lines"
            )]
            let lines = lines as i32;
            self.events.push(NativeEvent::Scroll(lines));
        }
    }
}

impl Dispatch<wl_registry::WlRegistry, GlobalListContents> for WaylandState {
    fn event(
        _state: &mut Self,
        _registry: &wl_registry::WlRegistry,
        _event: wl_registry::Event,
        _data: &GlobalListContents,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        // Globals appearing after startup are not used.
    }
}

delegate_noop!(WaylandState: wl_compositor::WlCompositor);
delegate_noop!(WaylandState: wl_shm_pool::WlShmPool);
delegate_noop!(WaylandState: ignore wl_surface::WlSurface);
delegate_noop!(WaylandState: ignore wl_shm::WlShm);
delegate_noop!(WaylandState: ignore wl_buffer::WlBuffer);
delegate_noop!(WaylandState: ignore wl_callback::WlCallback);

impl Dispatch<xdg_wm_base::XdgWmBase, ()> for WaylandState {
    fn event(
        _state: &mut Self,
        wm_base: &xdg_wm_base::XdgWmBase,
        event: xdg_wm_base::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            wm_base.pong(serial);
        }
    }
}

impl Dispatch<xdg_surface::XdgSurface, ()> for WaylandState {
    fn event(
        state: &mut Self,
        xdg_surface: &xdg_surface::XdgSurface,
        event: xdg_surface::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let xdg_surface::Event::Configure { serial } = event {
            xdg_surface.ack_configure(serial);
            state.configured();
        }
    }
}

impl Dispatch<xdg_toplevel::XdgToplevel, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _toplevel: &xdg_toplevel::XdgToplevel,
        event: xdg_toplevel::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            xdg_toplevel::Event::Configure { width, height, .. } => {
                state.suggested = (
                    u32::try_from(width).unwrap_or(0),
                    u32::try_from(height).unwrap_or(0),
                );
            }
            xdg_toplevel::Event::Close => state.events.push(NativeEvent::CloseRequested),
            _ => {}
        }
    }
}

impl Dispatch<wl_seat::WlSeat, ()> for WaylandState {
    fn event(
        state: &mut Self,
        seat: &wl_seat::WlSeat,
        event: wl_seat::Event,
        _data: &(),
        _conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        let wl_seat::Event::Capabilities {
            capabilities: WEnum::Value(caps),
        } = event
        else {
            return;
        };
        if caps.contains(wl_seat::Capability::Keyboard) && state.keyboard.is_none() {
            state.keyboard = Some(seat.get_keyboard(qh, ()));
        }
        if caps.contains(wl_seat::Capability::Pointer) && state.pointer.is_none() {
            state.pointer = Some(seat.get_pointer(qh, ()));
        }
    }
}

impl Dispatch<wl_keyboard::WlKeyboard, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _keyboard: &wl_keyboard::WlKeyboard,
        event: wl_keyboard::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_keyboard::Event::Keymap { .. } => {
                log::debug!("ignoring compositor keymap, using built-in US layout");
            }
            wl_keyboard::Event::Enter { .. } => state.events.push(NativeEvent::Focus(true)),
            wl_keyboard::Event::Leave { .. } => state.events.push(NativeEvent::Focus(false)),
            wl_keyboard::Event::Key {
                key,
                state: key_state,
                ..
            } => {
                if !matches!(key_state, WEnum::Value(wl_keyboard::KeyState::Pressed)) {
                    return;
                }
                let (text, keysym) = state.keymap.lookup(key);
                state.events.push(NativeEvent::Key(RawKey::Lookup {
                    text,
                    keysym,
                    mods: state.keymap.modifiers(),
                }));
            }
            wl_keyboard::Event::Modifiers {
                mods_depressed,
                mods_latched,
                mods_locked,
                ..
            } => state
                .keymap
                .set_modifiers(mods_depressed, mods_latched, mods_locked),
            _ => {}
        }
    }
}

impl Dispatch<wl_pointer::WlPointer, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _pointer: &wl_pointer::WlPointer,
        event: wl_pointer::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_pointer::Event::Button {
                button,
                state: button_state,
                ..
            } => {
                if !matches!(button_state, WEnum::Value(wl_pointer::ButtonState::Pressed)) {
                    return;
                }
                state.events.push(NativeEvent::Button(button_number(button)));
            }
            wl_pointer::Event::Axis {
                axis: WEnum::Value(wl_pointer::Axis::VerticalScroll),
                value,
                ..
            } => state.scrolled(value),
            _ => {}
        }
    }
}

/// Maps evdev button codes to the classic 1-based numbering.
fn button_number(code: u32) -> u32 {
    match code {
        BTN_LEFT => 1,
        BTN_MIDDLE => 2,
        BTN_RIGHT => 3,
        BTN_SIDE => 8,
        BTN_EXTRA => 9,
        other => other,
    }
}
