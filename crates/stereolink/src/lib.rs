// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! # stereolink - client stack for VeriDepth network stereo cameras
//!
//! A pure Rust client for the VeriDepth camera protocol family: UDP broadcast
//! device discovery, a TCP parameter channel for typed configuration
//! read/write, and a TCP image stream delivering stereo frames either
//! synchronously or through a background reception thread.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stereolink::{DeviceEnumeration, ParameterChannel, StreamChannel, Result};
//!
//! fn main() -> Result<()> {
//!     // Find cameras on the local subnets
//!     let devices = DeviceEnumeration::new().discover_devices()?;
//!     let device = devices.first().expect("no camera answered");
//!
//!     // Read and tweak parameters
//!     let params = ParameterChannel::connect(device)?;
//!     params.write_bool(stereolink::ParameterId::AutoExposure as i32, true)?;
//!
//!     // Pull one frame
//!     let stream = StreamChannel::new(device)?;
//!     stream.set_stream_type(stereolink::stream::STREAM_LEFT | stereolink::stream::STREAM_RIGHT)?;
//!     stream.start()?;
//!     let frame = stream.recv_image_set(None)?;
//!     println!("{}x{} at t={}", frame.width(), frame.height(), frame.timestamp());
//!     stream.stop();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                      Application Layer                       |
//! |  DeviceConfigure | AsyncStream (callback delivery)           |
//! +--------------------------------------------------------------+
//! |                       Channel Layer                          |
//! |  DeviceEnumeration | ParameterChannel | StreamChannel        |
//! +--------------------------------------------------------------+
//! |                     Wire / Framing Layer                     |
//! |  length-prefix frames | little-endian message encoding       |
//! +--------------------------------------------------------------+
//! |                      Transport Layer                         |
//! |  UDP broadcast (2002) | TCP stream (2003) | TCP params (2004)|
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DeviceEnumeration`] | Broadcast discovery of cameras on attached subnets |
//! | [`DeviceInfo`] | Identity of a discovered camera, source of channel endpoints |
//! | [`ParameterChannel`] | Serialized typed read/write parameter exchanges |
//! | [`DeviceConfigure`] | Named accessors for exposure, gain, white balance, LEDs |
//! | [`StreamChannel`] | Image stream session control and synchronous reception |
//! | [`AsyncStream`] | Background reception thread delivering to a listener |

/// Protocol constants: well-known ports, tokens and limits.
pub mod config;
/// Device identity and protocol version compatibility.
pub mod device;
/// UDP broadcast device discovery.
pub mod discovery;
/// Error type shared by every layer.
pub mod error;
/// Image sets, buffers and per-buffer metadata.
pub mod imageset;
/// Parameter channel and high-level configuration.
pub mod param;
/// Image stream channel, synchronous and asynchronous.
pub mod stream;
/// TCP transport primitives and length-prefix framing.
pub mod transport;
/// Wire encoding of protocol messages.
pub mod wire;

pub use config::PROTOCOL_VERSION;
pub use device::{DeviceInfo, DeviceStatus, ProtocolVersion};
pub use discovery::DeviceEnumeration;
pub use error::{Error, Result};
pub use imageset::{ImageChannel, ImageFormat, ImageMeta, ImageSet, ImageSetMeta};
pub use param::{DeviceConfigure, ParameterChannel, ParameterId};
pub use stream::{AsyncStream, ImageSetListener, StreamChannel};
pub use wire::DeviceDescriptor;
