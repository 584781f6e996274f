// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Socket readiness for the owned driver.

use std::io;
use std::os::fd::OwnedFd;

use rustix::event::{PollFd, PollFlags, poll};
use rustix::io::Errno;
use wayland_client::Connection;

/// Blocks until the compositor socket is readable.
///
/// Holds a duplicate of the connection's descriptor so it can live on the
/// readiness thread. It never reads; the loop thread does that during
/// [`drain_events`](smash_core::backend::Platform::drain_events).
#[derive(Debug)]
pub struct FdReadiness {
    fd: OwnedFd,
}

impl FdReadiness {
    pub(crate) fn new(conn: &Connection) -> io::Result<Self> {
        let fd = conn.backend().poll_fd().try_clone_to_owned()?;
        Ok(Self { fd })
    }
}

impl smash_core::backend::Readiness for FdReadiness {
    fn wait(&mut self) -> io::Result<()> {
        loop {
            let mut fds = [PollFd::new(&self.fd, PollFlags::IN)];
            match poll(&mut fds, None) {
                Ok(_) => return Ok(()),
                Err(Errno::INTR) => {}
                Err(err) => return Err(err.into()),
            }
        }
    }
}
