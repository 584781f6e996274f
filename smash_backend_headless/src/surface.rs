// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory on-screen surface.

use smash_core::Error;
use smash_core::backend::Onscreen;
use smash_core::render::{Pixmap, Rect};

/// An on-screen surface that keeps its pixels in memory.
///
/// Every blit is recorded, so callers can check what the loop presented.
#[derive(Debug)]
pub struct MemorySurface {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    blits: Vec<Rect>,
}

impl MemorySurface {
    pub(crate) fn new(width: u32, height: u32) -> Result<Self, Error> {
        let len = usize::try_from(u64::from(width) * u64::from(height)).map_err(|_| {
            Error::SurfaceCreation {
                width,
                height,
                reason: "too large for this host".into(),
            }
        })?;
        Ok(Self {
            width,
            height,
            pixels: vec![0; len],
            blits: Vec::new(),
        })
    }

    /// Presented pixels, row-major, `0xAARRGGBB`.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Returns one presented pixel, or [`None`] outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Every rectangle blitted so far, oldest first.
    #[must_use]
    pub fn blits(&self) -> &[Rect] {
        &self.blits
    }

    /// Number of presents.
    #[must_use]
    pub fn presents(&self) -> usize {
        self.blits.len()
    }
}

impl Onscreen for MemorySurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn blit(&mut self, src: &Pixmap, rect: Rect) -> Result<(), Error> {
        if src.size() != (self.width, self.height) {
            return Err(Error::InvalidState("blit source size differs from surface"));
        }
        src.copy_rect_into(rect, &mut self.pixels, self.width as usize);
        self.blits.push(rect);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blit_replaces_only_the_rect() {
        let mut src = Pixmap::new(4, 4).unwrap();
        src.fill(0xff11_2233);
        let mut surface = MemorySurface::new(4, 4).unwrap();
        surface.blit(&src, Rect::new(1, 1, 2, 2)).unwrap();

        assert_eq!(surface.pixel(1, 1), Some(0xff11_2233));
        assert_eq!(surface.pixel(2, 2), Some(0xff11_2233));
        assert_eq!(surface.pixel(0, 0), Some(0), "outside the rect stays untouched");
        assert_eq!(surface.pixel(3, 3), Some(0));
        assert_eq!(surface.pixel(4, 0), None);
        assert_eq!(surface.blits(), &[Rect::new(1, 1, 2, 2)]);
    }

    #[test]
    fn blit_rejects_mismatched_source() {
        let src = Pixmap::new(2, 2).unwrap();
        let mut surface = MemorySurface::new(4, 4).unwrap();
        assert!(matches!(
            surface.blit(&src, Rect::new(0, 0, 2, 2)),
            Err(Error::InvalidState(_))
        ));
        assert_eq!(surface.presents(), 0);
    }
}
