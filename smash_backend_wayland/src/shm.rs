// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared-memory on-screen surface.
//!
//! One `wl_buffer` backed by a memfd. Pixels are written with
//! positioned writes, so no mapping (and no `unsafe`) is needed. The layout
//! is `ARGB8888`, which matches the [`Pixmap`] word order on little-endian
//! hosts.

use std::fs::File;
use std::os::fd::AsFd;
use std::os::unix::fs::FileExt;

use rustix::fs::{MemfdFlags, memfd_create};
use smash_core::Error;
use smash_core::backend::Onscreen;
use smash_core::render::{Pixmap, Rect};
use wayland_client::QueueHandle;
use wayland_client::protocol::{wl_buffer, wl_shm, wl_shm_pool, wl_surface};

use crate::state::WaylandState;

/// The visible surface of a [`WaylandPlatform`](crate::WaylandPlatform)
/// window.
#[derive(Debug)]
pub struct ShmSurface {
    file: File,
    pool: wl_shm_pool::WlShmPool,
    buffer: wl_buffer::WlBuffer,
    surface: wl_surface::WlSurface,
    width: u32,
    height: u32,
}

impl ShmSurface {
    pub(crate) fn new(
        shm: &wl_shm::WlShm,
        surface: &wl_surface::WlSurface,
        qh: &QueueHandle<WaylandState>,
        width: u32,
        height: u32,
    ) -> Result<Self, Error> {
        let fail = |reason: String| Error::SurfaceCreation {
            width,
            height,
            reason,
        };
        let stride = width
            .checked_mul(4)
            .ok_or_else(|| fail("stride overflow".into()))?;
        let len = stride
            .checked_mul(height)
            .and_then(|len| i32::try_from(len).ok())
            .ok_or_else(|| fail("buffer too large".into()))?;
        let fd = memfd_create("smash-shm", MemfdFlags::CLOEXEC)
            .map_err(|err| fail(format!("memfd_create: {err}")))?;
        let file = File::from(fd);
        file.set_len(u64::from(stride) * u64::from(height))
            .map_err(|err| fail(format!("resize shm file: {err}")))?;

        let pool = shm.create_pool(file.as_fd(), len, qh, ());
        let buffer = pool.create_buffer(
            0,
            to_i32(width),
            to_i32(height),
            to_i32(stride),
            wl_shm::Format::Argb8888,
            qh,
            (),
        );
        log::debug!("created {width}x{height} shm buffer");
        Ok(Self {
            file,
            pool,
            buffer,
            surface: surface.clone(),
            width,
            height,
        })
    }

    fn write_rows(&self, src: &Pixmap, rect: Rect) -> std::io::Result<()> {
        let stride = u64::from(self.width) * 4;
        for row in 0..rect.height {
            let y = u64::try_from(rect.y).unwrap_or(0) + u64::from(row);
            let x = u64::try_from(rect.x).unwrap_or(0);
            let pixels = src.rect_row(rect, row);
            self.file
                .write_all_at(bytemuck::cast_slice(pixels), y * stride + x * 4)?;
        }
        Ok(())
    }
}

impl Onscreen for ShmSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn blit(&mut self, src: &Pixmap, rect: Rect) -> Result<(), Error> {
        self.write_rows(src, rect)?;
        self.surface.attach(Some(&self.buffer), 0, 0);
        self.surface.damage_buffer(
            rect.x,
            rect.y,
            to_i32(rect.width),
            to_i32(rect.height),
        );
        self.surface.commit();
        Ok(())
    }
}

impl Drop for ShmSurface {
    fn drop(&mut self) {
        self.buffer.destroy();
        self.pool.destroy();
    }
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
