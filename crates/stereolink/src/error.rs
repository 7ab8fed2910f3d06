// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! Error type shared by every layer of the protocol stack.
//!
//! All failures are unrecoverable at the point of detection: a failed
//! exchange leaves the connection in an undefined state and the caller must
//! reopen the channel. No layer retries internally.

use crate::device::ProtocolVersion;
use std::io;

/// Errors returned by stereolink operations.
#[derive(Debug)]
pub enum Error {
    /// Address/service resolution yielded no usable IPv4 endpoint.
    Resolution(String),
    /// TCP connection establishment failed.
    Connect(io::Error),
    /// A send/receive moved fewer bytes than required. Partial transfers are
    /// never reported as success.
    ShortTransfer {
        /// Bytes actually transferred before the failure.
        transferred: usize,
        /// Bytes the caller required.
        required: usize,
        /// Underlying socket error (or a synthesized EOF).
        source: io::Error,
    },
    /// Framing or decoding violation (non-positive declared length, malformed
    /// message, protocol version drift between client and device).
    Protocol(String),
    /// The device answered with a non-OK status code; carries its message.
    Device(String),
    /// Client-side argument validation failed before any network I/O.
    InvalidArgument(String),
    /// The parameter id is not a member of the known enumeration.
    InvalidParameter(i32),
    /// `start()` was called while a streaming connection is already open.
    AlreadyStreaming,
    /// The device's advertised protocol version is not compatible with this
    /// client build.
    Incompatible {
        /// Version the device announced.
        device: ProtocolVersion,
    },
    /// Other I/O error (socket setup, calibration file write).
    Io(io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Resolution(msg) => write!(f, "address resolution failed: {}", msg),
            Error::Connect(e) => write!(f, "connect failed: {}", e),
            Error::ShortTransfer {
                transferred,
                required,
                source,
            } => write!(
                f,
                "short transfer: moved {} of {} required bytes: {}",
                transferred, required, source
            ),
            Error::Protocol(msg) => write!(f, "protocol error: {}", msg),
            Error::Device(msg) => write!(f, "device reported an error: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::InvalidParameter(id) => {
                write!(f, "parameter id {} is not a known ParameterId", id)
            }
            Error::AlreadyStreaming => write!(
                f,
                "a streaming connection is already open, stop it before starting again"
            ),
            Error::Incompatible { device } => write!(
                f,
                "device protocol version {} is not compatible with client version {}",
                device,
                crate::config::PROTOCOL_VERSION
            ),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connect(e) | Error::Io(e) => Some(e),
            Error::ShortTransfer { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenient alias for API results using the public [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
