// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Off-screen pixel buffer.

use core::fmt;

use super::Rect;
use crate::Error;

/// A 32-bit ARGB off-screen buffer (`0xAARRGGBB`, one `u32` per pixel, rows
/// packed without padding).
///
/// This is the backing store the delegate draws into.
#[derive(Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    data: Vec<u32>,
}

impl Pixmap {
    /// Allocates a zeroed pixmap.
    ///
    /// Fails with [`Error::SurfaceCreation`] if the buffer cannot be
    /// allocated.
    pub fn new(width: u32, height: u32) -> Result<Self, Error> {
        let fail = |reason: &str| Error::SurfaceCreation {
            width,
            height,
            reason: reason.into(),
        };
        let len = usize::try_from(u64::from(width) * u64::from(height))
            .map_err(|_| fail("size overflows the address space"))?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| fail("backing store allocation failed"))?;
        data.resize(len, 0);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels per row.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.width as usize
    }

    /// All pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.data
    }

    /// All pixels, row-major.
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// Returns one pixel, or [`None`] outside the pixmap.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y as usize * self.stride() + x as usize).copied()
    }

    /// Fills the whole pixmap with one color.
    pub fn fill(&mut self, argb: u32) {
        self.data.fill(argb);
    }

    /// Fills a rectangle (clipped to the pixmap) with one color.
    pub fn fill_rect(&mut self, rect: Rect, argb: u32) {
        let Some(rect) = rect.clip_to(self.width, self.height) else {
            return;
        };
        let stride = self.stride();
        for (start, end) in row_spans(rect, stride) {
            self.data[start..end].fill(argb);
        }
    }

    /// Copies `rect` of this pixmap into `dst`, replacing the destination
    /// pixels (no blending).
    ///
    /// `dst` is a row-major buffer with `dst_stride` pixels per row, at least
    /// as large as this pixmap. `rect` is clipped to this pixmap.
    pub fn copy_rect_into(&self, rect: Rect, dst: &mut [u32], dst_stride: usize) {
        let Some(rect) = rect.clip_to(self.width, self.height) else {
            return;
        };
        let stride = self.stride();
        for (row, (start, end)) in row_spans(rect, stride).enumerate() {
            let y = rect.y as usize + row;
            let dst_start = y * dst_stride + rect.x as usize;
            let dst_end = dst_start + (end - start);
            if let Some(dst_row) = dst.get_mut(dst_start..dst_end) {
                dst_row.copy_from_slice(&self.data[start..end]);
            }
        }
    }

    /// Returns the pixels of one row of `rect`, for backends that upload row
    /// by row. `row` is relative to `rect.y`.
    #[must_use]
    pub fn rect_row(&self, rect: Rect, row: u32) -> &[u32] {
        let Some(rect) = rect.clip_to(self.width, self.height) else {
            return &[];
        };
        if row >= rect.height {
            return &[];
        }
        let start = (rect.y as usize + row as usize) * self.stride() + rect.x as usize;
        &self.data[start..start + rect.width as usize]
    }
}

/// Yields `(start, end)` index spans for each row of an already-clipped rect.
fn row_spans(rect: Rect, stride: usize) -> impl Iterator<Item = (usize, usize)> {
    let x = rect.x as usize;
    let y = rect.y as usize;
    let w = rect.width as usize;
    (y..y + rect.height as usize).map(move |row| {
        let start = row * stride + x;
        (start, start + w)
    })
}

impl fmt::Debug for Pixmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pixmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
