// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backing store and on-screen surface pair.

use super::{Pixmap, Rect};
use crate::Error;
use crate::backend::{Onscreen, Platform};

/// Observable state of a [`DoubleBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderState {
    /// No surfaces exist yet (or the window was sized to zero).
    Uninitialized,
    /// Surfaces exist; the on-screen surface may be behind the backing store.
    Sized,
    /// The last full draw has been presented.
    Painted,
}

/// Result of [`DoubleBuffer::resize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resized {
    /// Dimensions matched; nothing was reallocated or drawn.
    Unchanged,
    /// Both surfaces were replaced, drawn and presented.
    Reallocated,
    /// A zero-area size was requested; both surfaces were released.
    Released,
}

struct Surfaces<O> {
    backing: Pixmap,
    onscreen: O,
}

/// The per-window surface pair.
///
/// Backing and on-screen surfaces are created, replaced and destroyed
/// together and always have equal dimensions.
pub struct DoubleBuffer<O> {
    surfaces: Option<Surfaces<O>>,
    painted: bool,
}

impl<O> Default for DoubleBuffer<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> core::fmt::Debug for DoubleBuffer<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DoubleBuffer")
            .field("size", &self.surfaces.as_ref().map(|s| s.backing.size()))
            .field("painted", &self.painted)
            .finish()
    }
}

impl<O> DoubleBuffer<O> {
    /// Creates an uninitialized buffer pair.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            surfaces: None,
            painted: false,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> RenderState {
        match (&self.surfaces, self.painted) {
            (None, _) => RenderState::Uninitialized,
            (Some(_), false) => RenderState::Sized,
            (Some(_), true) => RenderState::Painted,
        }
    }

    /// Returns the current size, `(0, 0)` while uninitialized.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.surfaces.as_ref().map_or((0, 0), |s| s.backing.size())
    }

    /// Returns the backing store, if sized.
    #[must_use]
    pub fn backing(&self) -> Option<&Pixmap> {
        self.surfaces.as_ref().map(|s| &s.backing)
    }

    /// Returns the on-screen surface, if sized.
    #[must_use]
    pub fn onscreen(&self) -> Option<&O> {
        self.surfaces.as_ref().map(|s| &s.onscreen)
    }
}

impl<O: Onscreen> DoubleBuffer<O> {
    /// Brings both surfaces to `width` × `height`.
    ///
    /// Unchanged dimensions are a no-op. Otherwise a new on-screen surface is
    /// requested from `platform`, a new backing store is allocated, the old
    /// pair is dropped, `draw` runs on the new backing store, and the whole
    /// surface is repainted. If allocation fails the old pair stays in place
    /// and the error is returned.
    pub fn resize<P>(
        &mut self,
        platform: &mut P,
        width: u32,
        height: u32,
        draw: impl FnOnce(&mut Pixmap),
    ) -> Result<Resized, Error>
    where
        P: Platform<Onscreen = O> + ?Sized,
    {
        if self.size() == (width, height) {
            return Ok(Resized::Unchanged);
        }
        if width == 0 || height == 0 {
            self.surfaces = None;
            self.painted = false;
            return Ok(Resized::Released);
        }
        let onscreen = platform.create_onscreen(width, height)?;
        let backing = Pixmap::new(width, height)?;
        self.surfaces = Some(Surfaces { backing, onscreen });
        self.painted = false;
        self.redraw(draw)?;
        Ok(Resized::Reallocated)
    }

    /// Copies `rect` of the backing store onto the on-screen surface.
    ///
    /// Returns the clipped rectangle that was blitted, or [`None`] when the
    /// clip was empty.
    pub fn repaint(&mut self, rect: Rect) -> Result<Option<Rect>, Error> {
        let surfaces = self
            .surfaces
            .as_mut()
            .ok_or(Error::InvalidState("repaint before first resize"))?;
        let (width, height) = surfaces.backing.size();
        let Some(clipped) = rect.clip_to(width, height) else {
            return Ok(None);
        };
        surfaces.onscreen.blit(&surfaces.backing, clipped)?;
        if clipped == Rect::from_size(width, height) {
            self.painted = true;
        }
        Ok(Some(clipped))
    }

    /// Runs `draw` on the backing store and repaints the whole surface.
    pub fn redraw(&mut self, draw: impl FnOnce(&mut Pixmap)) -> Result<Rect, Error> {
        let surfaces = self
            .surfaces
            .as_mut()
            .ok_or(Error::InvalidState("redraw before first resize"))?;
        draw(&mut surfaces.backing);
        self.painted = false;
        let (width, height) = surfaces.backing.size();
        let full = Rect::from_size(width, height);
        self.repaint(full)?;
        Ok(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlatform;

    #[test]
    fn first_resize_draws_once_and_repaints_fully() {
        let mut platform = FakePlatform::default();
        let mut buffer = DoubleBuffer::new();
        assert_eq!(buffer.state(), RenderState::Uninitialized);

        let mut draws = 0;
        let result = buffer
            .resize(&mut platform, 640, 400, |_| draws += 1)
            .unwrap();

        assert_eq!(result, Resized::Reallocated);
        assert_eq!(draws, 1, "resize should draw exactly once");
        assert_eq!(buffer.state(), RenderState::Painted);
        let onscreen = buffer.onscreen().unwrap();
        assert_eq!(onscreen.blits(), &[Rect::new(0, 0, 640, 400)]);
    }

    #[test]
    fn unchanged_resize_is_noop() {
        let mut platform = FakePlatform::default();
        let mut buffer = DoubleBuffer::new();
        buffer.resize(&mut platform, 10, 10, |_| {}).unwrap();

        let mut draws = 0;
        let result = buffer.resize(&mut platform, 10, 10, |_| draws += 1).unwrap();

        assert_eq!(result, Resized::Unchanged);
        assert_eq!(draws, 0, "unchanged resize must not draw");
        assert_eq!(platform.surfaces_created(), 1, "no reallocation expected");
    }

    #[test]
    fn sizes_always_match_last_request() {
        let mut platform = FakePlatform::default();
        let mut buffer = DoubleBuffer::new();
        for (w, h) in [(3, 4), (3, 4), (7, 1), (2, 9), (2, 9), (5, 5)] {
            buffer.resize(&mut platform, w, h, |_| {}).unwrap();
            assert_eq!(buffer.size(), (w, h));
            assert_eq!(buffer.backing().unwrap().size(), (w, h));
            assert_eq!(buffer.onscreen().unwrap().size(), (w, h));
        }
        assert_eq!(platform.surfaces_created(), 4);
    }

    #[test]
    fn repaint_before_resize_is_invalid_state() {
        let mut buffer = DoubleBuffer::<crate::testing::FakeOnscreen>::new();
        let err = buffer.repaint(Rect::new(0, 0, 1, 1)).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)), "got {err:?}");
    }

    #[test]
    fn repaint_clips_and_skips_empty() {
        let mut platform = FakePlatform::default();
        let mut buffer = DoubleBuffer::new();
        buffer.resize(&mut platform, 10, 10, |_| {}).unwrap();

        assert_eq!(
            buffer.repaint(Rect::new(8, 8, 5, 5)).unwrap(),
            Some(Rect::new(8, 8, 2, 2))
        );
        assert_eq!(buffer.repaint(Rect::new(20, 20, 5, 5)).unwrap(), None);
        assert_eq!(
            buffer.onscreen().unwrap().blits(),
            &[Rect::new(0, 0, 10, 10), Rect::new(8, 8, 2, 2)]
        );
    }

    #[test]
    fn repaint_copies_backing_pixels() {
        let mut platform = FakePlatform::default();
        let mut buffer = DoubleBuffer::new();
        buffer
            .resize(&mut platform, 2, 2, |p| p.fill(0xff11_2233))
            .unwrap();
        assert_eq!(
            buffer.onscreen().unwrap().pixels(),
            &[0xff11_2233; 4],
            "on-screen surface should mirror the backing store"
        );
    }

    #[test]
    fn failed_allocation_keeps_old_pair() {
        let mut platform = FakePlatform::default();
        let mut buffer = DoubleBuffer::new();
        buffer.resize(&mut platform, 4, 4, |_| {}).unwrap();

        platform.fail_next_surface();
        let err = buffer.resize(&mut platform, 8, 8, |_| {}).unwrap_err();
        assert!(matches!(err, Error::SurfaceCreation { .. }), "got {err:?}");
        assert_eq!(buffer.size(), (4, 4), "old surfaces should survive");
    }

    #[test]
    fn zero_size_releases_surfaces() {
        let mut platform = FakePlatform::default();
        let mut buffer = DoubleBuffer::new();
        buffer.resize(&mut platform, 4, 4, |_| {}).unwrap();
        assert_eq!(
            buffer.resize(&mut platform, 0, 0, |_| {}).unwrap(),
            Resized::Released
        );
        assert_eq!(buffer.state(), RenderState::Uninitialized);
    }
}
