// Copyright 2026 the Smash Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Failures fall into three groups:
//!
//! - **Fatal native-resource failures** ([`Error::SurfaceCreation`],
//!   [`Error::Backend`], [`Error::Io`]) propagate out of window creation and
//!   [`Reactor::run`](crate::reactor::Reactor::run). There is no window to
//!   recover into.
//! - **Sequencing violations** ([`Error::InvalidState`]) indicate a backend
//!   bug, such as a repaint issued before the first resize.
//! - **Backpressure** ([`DispatchError`]) is reported to the thread that
//!   tried to enqueue work.
//!
//! Protocol anomalies (unknown keys, unexpected events) are not errors; they
//! are logged and reported to the trace sink.

use std::io;

/// Errors raised by the loop, the renderer, or a backend primitive.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A backend could not allocate a native surface.
    #[error("failed to create {width}x{height} surface: {reason}")]
    SurfaceCreation {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Backend-provided description of the failure.
        reason: String,
    },

    /// The native connection or toolkit reported a failure.
    #[error("native backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// An operation was issued in a state that does not permit it.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// An I/O error while waiting on or talking to the native layer.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Wraps an arbitrary backend error.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::Backend(err.into())
    }
}

/// Why a task could not be handed to the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The bounded queue stayed full for the whole backpressure window.
    #[error("dispatch queue is full")]
    Full,
    /// The loop has quit; no further tasks will run.
    #[error("event loop has quit")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_creation_message_names_dimensions() {
        let err = Error::SurfaceCreation {
            width: 640,
            height: 400,
            reason: "out of memory".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to create 640x400 surface: out of memory"
        );
    }

    #[test]
    fn backend_wraps_string_errors() {
        let err = Error::backend("connection reset");
        assert_eq!(err.to_string(), "native backend failure: connection reset");
        assert!(
            std::error::Error::source(&err).is_some(),
            "backend error should expose its source"
        );
    }
}
