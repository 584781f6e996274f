// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in US layout for evdev key codes.
//!
//! The compositor also sends an xkb keymap, but the shell only needs the
//! characters of a plain US keyboard, so key codes are translated here into
//! the lookup form (text plus keysym) that `smash_core::keys` decodes.
//! Control+letter produces the C0 control byte, matching what a classic
//! lookup-string step reports.

use smash_core::event::KeyText;
use smash_core::keys::{Keysym, Modifiers};

// Modifier bits of the default xkb keymap, as sent in `wl_keyboard.modifiers`.
const MOD_SHIFT: u32 = 1 << 0;
const MOD_LOCK: u32 = 1 << 1;
const MOD_CONTROL: u32 = 1 << 2;
const MOD_ALT: u32 = 1 << 3;

/// Printable rows: first evdev code, unshifted chars, shifted chars.
const ROWS: [(u32, &str, &str); 5] = [
    (2, "1234567890-=", "!@#$%^&*()_+"),
    (16, "qwertyuiop[]", "QWERTYUIOP{}"),
    (30, "asdfghjkl;'`", "ASDFGHJKL:\"~"),
    (43, "\\zxcvbnm,./", "|ZXCVBNM<>?"),
    (57, " ", " "),
];

/// Keyboard modifier state plus code translation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Keymap {
    shift: bool,
    caps_lock: bool,
    control: bool,
    alt: bool,
}

impl Keymap {
    /// Applies a `wl_keyboard.modifiers` event.
    pub(crate) fn set_modifiers(&mut self, depressed: u32, latched: u32, locked: u32) {
        let active = depressed | latched;
        self.shift = active & MOD_SHIFT != 0;
        self.control = active & MOD_CONTROL != 0;
        self.alt = active & MOD_ALT != 0;
        self.caps_lock = locked & MOD_LOCK != 0;
    }

    /// Modifiers in the abstract key model. Alt acts as Meta.
    pub(crate) fn modifiers(&self) -> Modifiers {
        let mut mods = Modifiers::empty();
        mods.set(Modifiers::CONTROL, self.control);
        mods.set(Modifiers::META, self.alt);
        mods
    }

    /// Translates a pressed evdev key code into text and keysym.
    pub(crate) fn lookup(&self, code: u32) -> (KeyText, Keysym) {
        if let Some((keysym, text)) = named(code) {
            return (KeyText::from_bytes(text), keysym);
        }
        let Some((plain, shifted)) = printable(code) else {
            return (KeyText::default(), Keysym(0x1008_0000 | code));
        };
        let upper = if plain.is_ascii_alphabetic() {
            self.shift != self.caps_lock
        } else {
            self.shift
        };
        let c = if upper { shifted } else { plain };
        let keysym = Keysym::from_char(c);
        if self.control && c.is_ascii_alphabetic() {
            let byte = (c.to_ascii_lowercase() as u8) & 0x1f;
            return (KeyText::from_bytes(&[byte]), keysym);
        }
        let mut buf = [0; 4];
        (KeyText::from_bytes(c.encode_utf8(&mut buf).as_bytes()), keysym)
    }
}

fn printable(code: u32) -> Option<(char, char)> {
    ROWS.iter().find_map(|&(start, plain, shifted)| {
        let index = usize::try_from(code.checked_sub(start)?).ok()?;
        Some((plain.chars().nth(index)?, shifted.chars().nth(index)?))
    })
}

fn named(code: u32) -> Option<(Keysym, &'static [u8])> {
    let keysym = match code {
        1 => return Some((Keysym::ESCAPE, b"\x1b")),
        14 => return Some((Keysym::BACKSPACE, b"\x08")),
        15 => return Some((Keysym::TAB, b"\t")),
        28 => return Some((Keysym::RETURN, b"\r")),
        96 => return Some((Keysym::KP_ENTER, b"\r")),
        111 => return Some((Keysym::DELETE, b"\x7f")),
        29 => Keysym::CONTROL_L,
        97 => Keysym::CONTROL_R,
        42 => Keysym::SHIFT_L,
        54 => Keysym::SHIFT_R,
        56 => Keysym::ALT_L,
        100 => Keysym::ALT_R,
        125 => Keysym::SUPER_L,
        126 => Keysym::SUPER_R,
        58 => Keysym::CAPS_LOCK,
        69 => Keysym::NUM_LOCK,
        59..=68 => Keysym(Keysym::F1.0 + (code - 59)),
        87 | 88 => Keysym(Keysym::F1.0 + (code - 87) + 10),
        102 => Keysym::HOME,
        103 => Keysym::UP,
        104 => Keysym::PAGE_UP,
        105 => Keysym::LEFT,
        106 => Keysym::RIGHT,
        107 => Keysym::END,
        108 => Keysym::DOWN,
        109 => Keysym::PAGE_DOWN,
        110 => Keysym::INSERT,
        _ => return None,
    };
    Some((keysym, b""))
}
