// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native events, decoded just far enough to be backend-independent.
//!
//! Backends translate their native unions into [`NativeEvent`]. Only the
//! translation is backend-specific; the reactor dispatches on the variant.

use crate::keys::{self, KeyInput, Keysym, Modifiers};
use crate::render::Rect;

/// One event from the native layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeEvent {
    /// The window content size changed (or was first established).
    Configure {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// Part of the on-screen surface needs repainting from the backing store.
    Expose(Rect),
    /// A key was pressed.
    Key(RawKey),
    /// Vertical scroll by whole lines; negative scrolls up.
    Scroll(i32),
    /// A pointer button was pressed. Buttons 4 and 5 are the legacy wheel.
    Button(u32),
    /// The window became visible.
    Mapped,
    /// Keyboard focus was gained (`true`) or lost (`false`).
    Focus(bool),
    /// The user asked to close the window.
    CloseRequested,
    /// An event the backend does not translate, by native type code.
    Unknown(u32),
}

/// A native key press before normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawKey {
    /// Lookup-string text plus keysym, from protocol clients.
    Lookup {
        /// Text produced by the lookup step.
        text: KeyText,
        /// Accompanying keysym.
        keysym: Keysym,
        /// Modifiers held.
        mods: Modifiers,
    },
    /// Keysym (keyval) only, from toolkits.
    Keysym {
        /// The keysym.
        keysym: Keysym,
        /// Modifiers held.
        mods: Modifiers,
    },
}

impl RawKey {
    /// Normalizes this key press.
    #[must_use]
    pub fn decode(&self) -> KeyInput {
        match *self {
            Self::Lookup { text, keysym, mods } => keys::decode_lookup(text.as_bytes(), keysym, mods),
            Self::Keysym { keysym, mods } => keys::decode_keysym(keysym, mods),
        }
    }
}

/// Inline storage for lookup-string output.
///
/// Holds up to [`KeyText::CAPACITY`] bytes; longer input is truncated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyText {
    bytes: [u8; Self::CAPACITY],
    len: u8,
}

impl KeyText {
    /// Maximum number of bytes stored.
    pub const CAPACITY: usize = 8;

    /// Copies up to [`Self::CAPACITY`] bytes.
    #[must_use]
    pub fn from_bytes(src: &[u8]) -> Self {
        let len = src.len().min(Self::CAPACITY);
        let mut bytes = [0; Self::CAPACITY];
        bytes[..len].copy_from_slice(&src[..len]);
        Self {
            bytes,
            len: u8::try_from(len).unwrap_or(u8::MAX),
        }
    }

    /// Returns the stored bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }
}

impl core::fmt::Debug for KeyText {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "KeyText({:?})", self.as_bytes())
    }
}
