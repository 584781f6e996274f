// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial damage tracking for partial repaints.

use core::fmt;

/// An axis-aligned rectangle in surface pixels.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl Rect {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin covering `width` × `height`.
    #[must_use]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clips to a `width` × `height` surface at the origin.
    ///
    /// Returns [`None`] when nothing of the rectangle is inside the surface.
    #[must_use]
    pub fn clip_to(self, width: u32, height: u32) -> Option<Self> {
        let x0 = i64::from(self.x).max(0);
        let y0 = i64::from(self.y).max(0);
        let x1 = (i64::from(self.x) + i64::from(self.width)).min(i64::from(width));
        let y1 = (i64::from(self.y) + i64::from(self.height)).min(i64::from(height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x: i32::try_from(x0).ok()?,
            y: i32::try_from(y0).ok()?,
            width: u32::try_from(x1 - x0).ok()?,
            height: u32::try_from(y1 - y0).ok()?,
        })
    }

    /// Returns the smallest rectangle containing both.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let x0 = i64::from(self.x).min(i64::from(other.x));
        let y0 = i64::from(self.y).min(i64::from(other.y));
        let x1 = (i64::from(self.x) + i64::from(self.width))
            .max(i64::from(other.x) + i64::from(other.width));
        let y1 = (i64::from(self.y) + i64::from(self.height))
            .max(i64::from(other.y) + i64::from(other.height));
        Self {
            x: i32::try_from(x0).unwrap_or(i32::MIN),
            y: i32::try_from(y0).unwrap_or(i32::MIN),
            width: u32::try_from(x1 - x0).unwrap_or(u32::MAX),
            height: u32::try_from(y1 - y0).unwrap_or(u32::MAX),
        }
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect({}, {}, {}x{})",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Damage accumulated over one batch of native events.
///
/// Backends can deliver several exposures per batch; collecting them first
/// keeps the number of blits down.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Damage {
    /// Nothing needs repainting.
    #[default]
    None,
    /// A list of rectangles needs repainting.
    Rects(Vec<Rect>),
    /// The entire surface needs repainting.
    Full,
}

impl Damage {
    /// Rectangle lists longer than this collapse to their bounding box.
    pub const MAX_RECTS: usize = 8;

    /// Returns `true` if nothing needs repainting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Adds one damaged rectangle.
    pub fn add(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        match self {
            Self::Full => {}
            Self::None => *self = Self::Rects(vec![rect]),
            Self::Rects(rects) => {
                if rects.contains(&rect) {
                    return;
                }
                rects.push(rect);
                if rects.len() > Self::MAX_RECTS {
                    let bounds = rects.iter().fold(Rect::default(), |acc, r| acc.union(*r));
                    *rects = vec![bounds];
                }
            }
        }
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&*self, other) {
            (Self::Full, _) | (_, Self::Full) => *self = Self::Full,
            (_, Self::None) => {}
            (_, Self::Rects(rects)) => {
                for rect in rects {
                    self.add(*rect);
                }
            }
        }
    }

    /// Takes the accumulated damage, leaving [`Damage::None`].
    #[must_use]
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }

    /// Resolves the damage into concrete rectangles for a surface size.
    #[must_use]
    pub fn rects(&self, width: u32, height: u32) -> Vec<Rect> {
        match self {
            Self::None => Vec::new(),
            Self::Full => vec![Rect::from_size(width, height)],
            Self::Rects(rects) => rects
                .iter()
                .filter_map(|r| r.clip_to(width, height))
                .collect(),
        }
    }
}
