// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key event normalization.
//!
//! Native key presses arrive in one of two shapes depending on the backend
//! family:
//!
//! - **Lookup form**: a protocol client translates the hardware code itself
//!   and hands over the resulting text bytes plus the keysym (the
//!   `XLookupString` shape). Control-modified letters arrive as C0 control
//!   bytes and must be mapped back. See [`decode_lookup`].
//! - **Keysym form**: a retained toolkit reports only the keysym (keyval)
//!   and the modifier state. See [`decode_keysym`].
//!
//! Both produce a [`KeyInput`]: either one abstract [`Key`], a pure modifier
//! press, or an unhandled keysym that the caller should report.
//!
//! Keysym values follow the X11 `keysymdef.h` numbering, which both native
//! layers share.

use core::fmt;

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Control.
        const CONTROL = 1 << 0;
        /// Meta (reported as Alt / Mod1 by most native layers).
        const META = 1 << 1;
    }
}

/// Abstract key symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Sym {
    /// No symbol.
    #[default]
    None,
    /// A character-producing key.
    Char(char),
    /// Backspace.
    Backspace,
    /// Tab.
    Tab,
    /// Enter / Return.
    Enter,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
}

impl fmt::Display for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("NoSym"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Backspace => f.write_str("Backspace"),
            Self::Tab => f.write_str("Tab"),
            Self::Enter => f.write_str("Enter"),
            Self::Left => f.write_str("Left"),
            Self::Right => f.write_str("Right"),
            Self::Up => f.write_str("Up"),
            Self::Down => f.write_str("Down"),
        }
    }
}

/// A normalized key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Key {
    /// The key symbol.
    pub sym: Sym,
    /// Modifiers held during the press.
    pub mods: Modifiers,
}

impl Key {
    /// Creates a key with no modifiers.
    #[must_use]
    pub const fn new(sym: Sym) -> Self {
        Self {
            sym,
            mods: Modifiers::empty(),
        }
    }

    /// Creates a key with the given modifiers.
    #[must_use]
    pub const fn with_mods(sym: Sym, mods: Modifiers) -> Self {
        Self { sym, mods }
    }
}

impl fmt::Display for Key {
    /// Formats as `C-M-x` style, e.g. `C-a` or `M-Left`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.contains(Modifiers::CONTROL) {
            f.write_str("C-")?;
        }
        if self.mods.contains(Modifiers::META) {
            f.write_str("M-")?;
        }
        write!(f, "{}", self.sym)
    }
}

/// A native keysym value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Keysym(pub u32);

impl Keysym {
    /// No keysym.
    pub const NONE: Self = Self(0);
    /// Space.
    pub const SPACE: Self = Self(0x0020);
    /// Backspace.
    pub const BACKSPACE: Self = Self(0xff08);
    /// Tab.
    pub const TAB: Self = Self(0xff09);
    /// Return.
    pub const RETURN: Self = Self(0xff0d);
    /// Escape.
    pub const ESCAPE: Self = Self(0xff1b);
    /// Home.
    pub const HOME: Self = Self(0xff50);
    /// Left arrow.
    pub const LEFT: Self = Self(0xff51);
    /// Up arrow.
    pub const UP: Self = Self(0xff52);
    /// Right arrow.
    pub const RIGHT: Self = Self(0xff53);
    /// Down arrow.
    pub const DOWN: Self = Self(0xff54);
    /// Page up.
    pub const PAGE_UP: Self = Self(0xff55);
    /// Page down.
    pub const PAGE_DOWN: Self = Self(0xff56);
    /// End.
    pub const END: Self = Self(0xff57);
    /// Insert.
    pub const INSERT: Self = Self(0xff63);
    /// Num lock.
    pub const NUM_LOCK: Self = Self(0xff7f);
    /// Keypad enter.
    pub const KP_ENTER: Self = Self(0xff8d);
    /// Function key F1; F2..F12 follow consecutively.
    pub const F1: Self = Self(0xffbe);
    /// Left shift.
    pub const SHIFT_L: Self = Self(0xffe1);
    /// Right shift.
    pub const SHIFT_R: Self = Self(0xffe2);
    /// Left control.
    pub const CONTROL_L: Self = Self(0xffe3);
    /// Right control.
    pub const CONTROL_R: Self = Self(0xffe4);
    /// Caps lock.
    pub const CAPS_LOCK: Self = Self(0xffe5);
    /// Left meta.
    pub const META_L: Self = Self(0xffe7);
    /// Right meta.
    pub const META_R: Self = Self(0xffe8);
    /// Left alt.
    pub const ALT_L: Self = Self(0xffe9);
    /// Right alt.
    pub const ALT_R: Self = Self(0xffea);
    /// Left super.
    pub const SUPER_L: Self = Self(0xffeb);
    /// Right super.
    pub const SUPER_R: Self = Self(0xffec);
    /// Left hyper.
    pub const HYPER_L: Self = Self(0xffed);
    /// Right hyper.
    pub const HYPER_R: Self = Self(0xffee);
    /// Delete.
    pub const DELETE: Self = Self(0xffff);

    /// Returns the keysym for a Latin-1 or Unicode character.
    #[must_use]
    pub fn from_char(c: char) -> Self {
        let cp = u32::from(c);
        match cp {
            0x20..=0x7e | 0xa0..=0xff => Self(cp),
            _ => Self(0x0100_0000 + cp),
        }
    }

    /// Returns `true` for keysyms that only change modifier or lock state.
    #[must_use]
    pub const fn is_modifier(self) -> bool {
        matches!(
            self.0,
            // Shift_L ..= Hyper_R, including Caps_Lock and Shift_Lock.
            0xffe1..=0xffee
            // ISO_Lock ..= ISO_Level5_Lock (Level3/Level5 shifts, group shifts).
            | 0xfe01..=0xfe13
            // Mode_switch, Num_Lock.
            | 0xff7e
            | 0xff7f
        )
    }

    /// Maps keysyms that have a named [`Sym`].
    #[must_use]
    pub const fn named_sym(self) -> Option<Sym> {
        match self.0 {
            0xff08 => Some(Sym::Backspace),
            // Tab, ISO_Left_Tab (shift+tab).
            0xff09 | 0xfe20 => Some(Sym::Tab),
            // Return, KP_Enter.
            0xff0d | 0xff8d => Some(Sym::Enter),
            0xff51 | 0xff96 => Some(Sym::Left),
            0xff52 | 0xff97 => Some(Sym::Up),
            0xff53 | 0xff98 => Some(Sym::Right),
            0xff54 | 0xff99 => Some(Sym::Down),
            _ => None,
        }
    }

    /// Converts a character-producing keysym to its character.
    ///
    /// Latin-1 keysyms map directly, `0x0100_0000 + cp` maps to code point
    /// `cp`, and the handful of function-range keysyms that conventionally
    /// produce a character (Escape, Delete, keypad digits and operators) are
    /// included.
    #[must_use]
    pub fn to_char(self) -> Option<char> {
        match self.0 {
            0x20..=0x7e | 0xa0..=0xff => char::from_u32(self.0),
            0x0100_0100..=0x0110_ffff => char::from_u32(self.0 - 0x0100_0000),
            0xff1b => Some('\u{1b}'),
            0xffff => Some('\u{7f}'),
            0xff80 => Some(' '),
            0xffaa => Some('*'),
            0xffab => Some('+'),
            0xffac => Some(','),
            0xffad => Some('-'),
            0xffae => Some('.'),
            0xffaf => Some('/'),
            0xffb0..=0xffb9 => char::from_digit(self.0 - 0xffb0, 10),
            0xffbd => Some('='),
            _ => None,
        }
    }
}

impl fmt::Debug for Keysym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keysym({:#x})", self.0)
    }
}

/// The result of normalizing one native key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyInput {
    /// The press produced a key event.
    Key(Key),
    /// The press only changed modifier state.
    Modifier,
    /// The keysym has no mapping. Callers should report it and move on.
    Unhandled(Keysym),
}

impl KeyInput {
    /// Returns the key event, if any.
    #[must_use]
    pub const fn key(self) -> Option<Key> {
        match self {
            Self::Key(key) => Some(key),
            Self::Modifier | Self::Unhandled(_) => None,
        }
    }
}

/// Decodes a key press delivered in lookup form.
///
/// `text` is the output of the backend's lookup-string step (possibly empty)
/// and `keysym` the accompanying keysym. When Control is held, C0 bytes
/// `0x01..=0x1a` are mapped back to `'a'..='z'`.
///
/// Text that decodes to more than one character is a backend anomaly: it is
/// logged and only the first character is used.
#[must_use]
pub fn decode_lookup(text: &[u8], keysym: Keysym, mods: Modifiers) -> KeyInput {
    if keysym.is_modifier() {
        return KeyInput::Modifier;
    }
    if let Some(c) = first_char(text) {
        return KeyInput::Key(Key::with_mods(decode_char(c, mods), mods));
    }
    decode_keysym(keysym, mods)
}

/// Decodes a key press delivered in keysym form.
#[must_use]
pub fn decode_keysym(keysym: Keysym, mods: Modifiers) -> KeyInput {
    if keysym.is_modifier() {
        return KeyInput::Modifier;
    }
    if let Some(sym) = keysym.named_sym() {
        return KeyInput::Key(Key::with_mods(sym, mods));
    }
    match keysym.to_char() {
        Some(c) => KeyInput::Key(Key::with_mods(decode_char(c, mods), mods)),
        None => KeyInput::Unhandled(keysym),
    }
}

fn decode_char(c: char, mods: Modifiers) -> Sym {
    let cp = u32::from(c);
    if mods.contains(Modifiers::CONTROL) && (0x01..=0x1a).contains(&cp) {
        // Undo the ctrl+letter => C0 control byte mapping.
        return char::from_u32(u32::from(b'a') + cp - 1).map_or(Sym::None, Sym::Char);
    }
    match c {
        '\u{8}' => Sym::Backspace,
        '\t' => Sym::Tab,
        '\r' => Sym::Enter,
        c => Sym::Char(c),
    }
}

/// Returns the first character of lookup text, treating NUL as no text.
fn first_char(text: &[u8]) -> Option<char> {
    let first = match core::str::from_utf8(text) {
        Ok(s) => {
            let mut chars = s.chars();
            let first = chars.next()?;
            if chars.next().is_some() {
                log::warn!("overlong key text {s:?}, using {first:?}");
            }
            first
        }
        Err(_) => {
            // Not UTF-8; treat as Latin-1 bytes.
            let &byte = text.first()?;
            if text.len() > 1 {
                log::warn!("overlong key text {text:?}, using {byte:#04x}");
            }
            char::from(byte)
        }
    };
    (first != '\0').then_some(first)
}
