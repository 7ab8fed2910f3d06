// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! Protocol constants - single source of truth.
//!
//! Every well-known port, token and limit of the camera protocol lives here.
//! Never hardcode these elsewhere.

use crate::device::ProtocolVersion;
use std::time::Duration;

/// Protocol version this client build speaks.
///
/// A device is compatible iff its major and minor match exactly and its patch
/// is greater than or equal to this one (see [`ProtocolVersion::is_compatible_with`]).
pub const PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion::new(2, 0, 0);

/// Fixed ASCII payload broadcast by the discovery exchange.
pub const DISCOVERY_TOKEN: &[u8] = b"STLK-DISCOVER";

/// Well-known UDP port devices listen on for discovery broadcasts.
pub const DISCOVERY_PORT: u16 = 2002;

/// Well-known TCP port for the image-stream channel.
pub const STREAM_PORT: u16 = 2003;

/// Well-known TCP port for the parameter channel.
pub const PARAMETER_PORT: u16 = 2004;

/// Upper bound for a single discovery response datagram.
///
/// UDP datagrams are received atomically; anything larger than this is
/// truncated by the kernel and will fail the length validation.
pub const MAX_DISCOVERY_DATAGRAM: usize = 1024;

/// Per-attempt receive timeout while collecting discovery responses.
///
/// Discovery is best-effort: the overall call returns whatever answered
/// within this window instead of blocking for stragglers.
pub const DISCOVERY_RECV_TIMEOUT: Duration = Duration::from_millis(1);

/// Size of the length prefix preceding every framed message.
pub const FRAME_HEADER_SIZE: usize = 4;

/// Sanity cap on a declared frame or image-buffer length (anti-OOM guard).
pub const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;
