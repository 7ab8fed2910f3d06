// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! Image stream channel: start/stop and synchronous frame reception.
//!
//! A session opens with one framed start request carrying the stream-type
//! bitmask and pixel format, and ends by closing the connection; there is no
//! stop message on the wire, the device treats connection teardown as the
//! stop signal. After the start response, the connection carries only
//! device-to-client frame traffic.

pub mod async_stream;

pub use async_stream::{AsyncStream, ImageSetListener};

use crate::config::{MAX_FRAME_SIZE, STREAM_PORT};
use crate::device::DeviceInfo;
use crate::error::{Error, Result};
use crate::imageset::{ImageChannel, ImageFormat, ImageSet, ImageSetMeta};
use crate::transport::{self, frame};
use crate::wire::{StreamRequest, StreamResponse, STREAM_REQUEST_START};
use parking_lot::Mutex;
use std::net::TcpStream;
use std::time::Duration;

/// Stream-type bit selecting the left camera image.
pub const STREAM_LEFT: i32 = ImageChannel::Left.bit();
/// Stream-type bit selecting the right camera image.
pub const STREAM_RIGHT: i32 = ImageChannel::Right.bit();
/// Stream-type bit selecting the computed depth map.
pub const STREAM_DEPTH: i32 = ImageChannel::Depth.bit();
/// Stream-type bit selecting the raw disparity map.
pub const STREAM_DISPARITY: i32 = ImageChannel::Disparity.bit();
/// All four image channels.
pub const STREAM_ALL: i32 = STREAM_LEFT | STREAM_RIGHT | STREAM_DEPTH | STREAM_DISPARITY;

/// Connection manager for one device's image stream.
///
/// Stream type and image format are session configuration: they may be
/// changed at any time but only take effect at the next [`StreamChannel::start`].
pub struct StreamChannel {
    address: String,
    port: u16,
    stream: Mutex<Option<TcpStream>>,
    request: Mutex<StreamRequest>,
}

impl StreamChannel {
    /// Channel for a discovered device on the well-known stream port.
    ///
    /// Refuses incompatible devices before any connection attempt.
    pub fn new(device: &DeviceInfo) -> Result<Self> {
        if !device.is_compatible() {
            return Err(Error::Incompatible {
                device: device.protocol_version(),
            });
        }
        Ok(Self::with_endpoint(
            &device.ip_address().to_string(),
            STREAM_PORT,
        ))
    }

    /// Channel for an explicit endpoint, bypassing discovery.
    pub fn with_endpoint(address: &str, port: u16) -> Self {
        Self {
            address: address.to_owned(),
            port,
            stream: Mutex::new(None),
            request: Mutex::new(StreamRequest {
                kind: STREAM_REQUEST_START,
                stream_type: STREAM_LEFT,
                image_format: ImageFormat::Rgb as i32,
            }),
        }
    }

    /// Select which image channels the next session will carry.
    ///
    /// `stream_type` is a bitmask of the `STREAM_*` constants; it must select
    /// at least one channel.
    pub fn set_stream_type(&self, stream_type: i32) -> Result<()> {
        if stream_type < 1 {
            return Err(Error::InvalidArgument(format!(
                "stream type {} selects no image channel",
                stream_type
            )));
        }
        self.request.lock().stream_type = stream_type;
        Ok(())
    }

    /// Select the pixel format the next session will use.
    pub fn set_image_format(&self, format: i32) -> Result<()> {
        if ImageFormat::from_i32(format).is_none() {
            return Err(Error::InvalidArgument(format!(
                "unknown image format {}",
                format
            )));
        }
        self.request.lock().image_format = format;
        Ok(())
    }

    /// Open the connection and perform the start exchange.
    ///
    /// Fails with [`Error::AlreadyStreaming`] while a session is open; stop
    /// first to change the configuration.
    pub fn start(&self) -> Result<()> {
        let mut slot = self.stream.lock();
        if slot.is_some() {
            return Err(Error::AlreadyStreaming);
        }

        let addr = transport::resolve(&self.address, self.port)?;
        let mut stream = transport::connect(addr)?;

        let request = *self.request.lock();
        let response: StreamResponse = frame::exchange(&mut stream, &request)?;
        if !response.ok() {
            return Err(Error::Device(response.message));
        }

        log::info!(
            "[STREAM] session {} started: type={:#06b} format={}",
            response.stream_id,
            request.stream_type,
            request.image_format
        );
        *slot = Some(stream);
        Ok(())
    }

    /// Close the streaming connection.
    ///
    /// No message is sent; the device treats connection teardown as the stop
    /// signal. Idempotent: stopping a channel that is not streaming is a
    /// no-op. Any receiver blocked on this connection fails with a transfer
    /// error, which is the expected way to unblock it.
    pub fn stop(&self) {
        if let Some(stream) = self.stream.lock().take() {
            transport::shutdown(&stream);
            log::info!("[STREAM] session stopped");
        }
    }

    /// Whether a streaming connection is currently open.
    pub fn is_streaming(&self) -> bool {
        self.stream.lock().is_some()
    }

    /// Block until the next complete image set arrives.
    ///
    /// The `timeout` argument is accepted for interface stability but not
    /// yet applied to the socket; reception blocks until a frame arrives or
    /// the connection closes.
    pub fn recv_image_set(&self, _timeout: Option<Duration>) -> Result<ImageSet> {
        // clone the handle so a concurrent stop() can close the socket and
        // unblock this receive instead of deadlocking on the channel lock
        let mut stream = {
            let slot = self.stream.lock();
            match slot.as_ref() {
                Some(stream) => stream.try_clone().map_err(Error::Io)?,
                None => {
                    return Err(Error::InvalidArgument(
                        "channel is not streaming, call start() first".into(),
                    ))
                }
            }
        };

        let meta: ImageSetMeta = frame::recv_message(&mut stream)?;
        let mut set = ImageSet::new(meta);

        // raw buffers follow the metadata record in fixed channel order
        for channel in ImageChannel::ALL {
            let buffer_size = set.meta().get(channel).map(|m| m.buffer_size);
            if let Some(size) = buffer_size {
                let size = size as usize;
                if size > MAX_FRAME_SIZE {
                    return Err(Error::Protocol(format!(
                        "buffer size {} for {:?} exceeds the {} byte cap",
                        size, channel, MAX_FRAME_SIZE
                    )));
                }
                let mut data = vec![0u8; size];
                transport::recv_exact(&mut stream, &mut data)?;
                set.set_buffer(channel, data);
            }
        }
        Ok(set)
    }
}

impl Drop for StreamChannel {
    fn drop(&mut self) {
        self.stop();
    }
}
