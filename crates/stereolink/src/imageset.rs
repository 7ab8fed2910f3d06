// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! Image sets: one captured bundle of left/right/depth/disparity buffers plus
//! per-buffer metadata.

use crate::error::{Error, Result};
use crate::wire::{Cursor, Encoder, WireDecode, WireEncode};

/// The four buffers an image set may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum ImageChannel {
    Left = 0,
    Right = 1,
    Depth = 2,
    Disparity = 3,
}

impl ImageChannel {
    /// Fixed wire order of the buffers following a metadata record.
    pub const ALL: [ImageChannel; 4] = [
        ImageChannel::Left,
        ImageChannel::Right,
        ImageChannel::Depth,
        ImageChannel::Disparity,
    ];

    /// Bit this channel occupies in presence masks and stream-type bitmasks.
    pub const fn bit(self) -> i32 {
        1 << (self as i32)
    }
}

/// Pixel format of a streamed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ImageFormat {
    #[default]
    Unknown = 0,
    Mono8 = 1,
    Rgb = 2,
    Yuv422 = 3,
    Disparity16 = 4,
    Depth32F = 5,
}

impl ImageFormat {
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            0 => Self::Unknown,
            1 => Self::Mono8,
            2 => Self::Rgb,
            3 => Self::Yuv422,
            4 => Self::Disparity16,
            5 => Self::Depth32F,
            _ => return None,
        })
    }
}

/// Metadata of a single image buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// Exact byte size of the raw buffer following the metadata record.
    pub buffer_size: u32,
    /// Capture timestamp, microseconds since the device epoch.
    pub timestamp: u64,
}

impl WireEncode for ImageMeta {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_u32(self.width);
        enc.put_u32(self.height);
        enc.put_i32(self.format as i32);
        enc.put_u32(self.buffer_size);
        enc.put_u64(self.timestamp);
    }
}

impl WireDecode for ImageMeta {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let width = cur.get_u32()?;
        let height = cur.get_u32()?;
        let raw_format = cur.get_i32()?;
        let format = ImageFormat::from_i32(raw_format)
            .ok_or_else(|| Error::Protocol(format!("unknown image format {}", raw_format)))?;
        Ok(Self {
            width,
            height,
            format,
            buffer_size: cur.get_u32()?,
            timestamp: cur.get_u64()?,
        })
    }
}

/// Metadata record preceding the raw buffers of one streamed frame.
///
/// A buffer is absent when its sub-record is absent here; absence is encoded
/// in the leading presence bitmask.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSetMeta {
    pub left: Option<ImageMeta>,
    pub right: Option<ImageMeta>,
    pub depth: Option<ImageMeta>,
    pub disparity: Option<ImageMeta>,
}

impl ImageSetMeta {
    pub fn get(&self, channel: ImageChannel) -> Option<&ImageMeta> {
        match channel {
            ImageChannel::Left => self.left.as_ref(),
            ImageChannel::Right => self.right.as_ref(),
            ImageChannel::Depth => self.depth.as_ref(),
            ImageChannel::Disparity => self.disparity.as_ref(),
        }
    }

    pub fn has(&self, channel: ImageChannel) -> bool {
        self.get(channel).is_some()
    }

    fn set(&mut self, channel: ImageChannel, meta: ImageMeta) {
        match channel {
            ImageChannel::Left => self.left = Some(meta),
            ImageChannel::Right => self.right = Some(meta),
            ImageChannel::Depth => self.depth = Some(meta),
            ImageChannel::Disparity => self.disparity = Some(meta),
        }
    }

    fn presence_mask(&self) -> u8 {
        let mut mask = 0u8;
        for channel in ImageChannel::ALL {
            if self.has(channel) {
                mask |= channel.bit() as u8;
            }
        }
        mask
    }
}

impl WireEncode for ImageSetMeta {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_u8(self.presence_mask());
        for channel in ImageChannel::ALL {
            if let Some(meta) = self.get(channel) {
                meta.encode(enc);
            }
        }
    }
}

impl WireDecode for ImageSetMeta {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let mask = cur.get_u8()?;
        if i32::from(mask) & !(ImageChannel::ALL.iter().fold(0, |m, c| m | c.bit())) != 0 {
            return Err(Error::Protocol(format!(
                "unknown channel bits in presence mask {:#04x}",
                mask
            )));
        }
        let mut meta = ImageSetMeta::default();
        for channel in ImageChannel::ALL {
            if i32::from(mask) & channel.bit() != 0 {
                meta.set(channel, ImageMeta::decode(cur)?);
            }
        }
        Ok(meta)
    }
}

/// One received frame: metadata plus up to four exclusively-owned raw pixel
/// buffers.
///
/// Buffers may be taken out by move, leaving the corresponding slot empty;
/// no buffer is ever shared across image sets.
#[derive(Debug, Default)]
pub struct ImageSet {
    meta: ImageSetMeta,
    buffers: [Option<Vec<u8>>; 4],
}

impl ImageSet {
    pub(crate) fn new(meta: ImageSetMeta) -> Self {
        Self {
            meta,
            buffers: Default::default(),
        }
    }

    pub(crate) fn set_buffer(&mut self, channel: ImageChannel, data: Vec<u8>) {
        self.buffers[channel as usize] = Some(data);
    }

    pub fn meta(&self) -> &ImageSetMeta {
        &self.meta
    }

    pub fn has_left(&self) -> bool {
        self.meta.has(ImageChannel::Left)
    }

    pub fn has_right(&self) -> bool {
        self.meta.has(ImageChannel::Right)
    }

    pub fn has_depth(&self) -> bool {
        self.meta.has(ImageChannel::Depth)
    }

    pub fn has_disparity(&self) -> bool {
        self.meta.has(ImageChannel::Disparity)
    }

    /// Borrow a received buffer, `None` if absent or already taken.
    pub fn buffer(&self, channel: ImageChannel) -> Option<&[u8]> {
        self.buffers[channel as usize].as_deref()
    }

    /// Move a buffer out of the set, leaving the slot empty.
    pub fn take_buffer(&mut self, channel: ImageChannel) -> Option<Vec<u8>> {
        self.buffers[channel as usize].take()
    }

    /// Image width; identical for left and right when both are streamed.
    /// Zero when the set carries no camera image.
    pub fn width(&self) -> u32 {
        self.camera_meta().map_or(0, |m| m.width)
    }

    /// Image height; see [`ImageSet::width`].
    pub fn height(&self) -> u32 {
        self.camera_meta().map_or(0, |m| m.height)
    }

    /// Pixel format of the camera images, `Unknown` when none present.
    pub fn format(&self) -> ImageFormat {
        self.camera_meta().map_or(ImageFormat::Unknown, |m| m.format)
    }

    /// Capture timestamp of the set: the left image's when present, the
    /// right one's otherwise, zero with no camera image.
    pub fn timestamp(&self) -> u64 {
        self.camera_meta().map_or(0, |m| m.timestamp)
    }

    fn camera_meta(&self) -> Option<&ImageMeta> {
        self.meta
            .get(ImageChannel::Left)
            .or_else(|| self.meta.get(ImageChannel::Right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{decode_from_slice, encode_to_vec};

    fn meta(width: u32, size: u32, ts: u64) -> ImageMeta {
        ImageMeta {
            width,
            height: 1080,
            format: ImageFormat::Mono8,
            buffer_size: size,
            timestamp: ts,
        }
    }

    #[test]
    fn test_meta_roundtrip_partial_presence() {
        let set_meta = ImageSetMeta {
            left: Some(meta(1440, 100, 5)),
            right: None,
            depth: None,
            disparity: Some(meta(1440, 200, 5)),
        };
        let decoded: ImageSetMeta = decode_from_slice(&encode_to_vec(&set_meta)).unwrap();
        assert_eq!(decoded, set_meta);
    }

    #[test]
    fn test_meta_rejects_unknown_presence_bits() {
        let buf = vec![0x40u8]; // bit 6 maps to no channel
        assert!(decode_from_slice::<ImageSetMeta>(&buf).is_err());
    }

    #[test]
    fn test_meta_rejects_unknown_format() {
        let mut enc = Encoder::new();
        enc.put_u8(ImageChannel::Left.bit() as u8);
        enc.put_u32(10);
        enc.put_u32(10);
        enc.put_i32(99); // no such format
        enc.put_u32(100);
        enc.put_u64(0);
        assert!(decode_from_slice::<ImageSetMeta>(&enc.into_vec()).is_err());
    }

    #[test]
    fn test_take_buffer_leaves_slot_empty() {
        let mut set = ImageSet::new(ImageSetMeta {
            left: Some(meta(4, 4, 1)),
            ..Default::default()
        });
        set.set_buffer(ImageChannel::Left, vec![1, 2, 3, 4]);

        assert_eq!(set.buffer(ImageChannel::Left), Some(&[1, 2, 3, 4][..]));
        assert_eq!(set.take_buffer(ImageChannel::Left), Some(vec![1, 2, 3, 4]));
        assert!(set.buffer(ImageChannel::Left).is_none());
        assert!(set.take_buffer(ImageChannel::Left).is_none());
        // metadata still says the channel was present
        assert!(set.has_left());
    }

    #[test]
    fn test_accessors_fall_back_left_then_right() {
        let left_only = ImageSet::new(ImageSetMeta {
            left: Some(meta(1440, 8, 42)),
            ..Default::default()
        });
        assert_eq!(left_only.width(), 1440);
        assert_eq!(left_only.timestamp(), 42);

        let right_only = ImageSet::new(ImageSetMeta {
            right: Some(meta(720, 8, 43)),
            ..Default::default()
        });
        assert_eq!(right_only.width(), 720);
        assert_eq!(right_only.timestamp(), 43);

        let empty = ImageSet::default();
        assert_eq!(empty.width(), 0);
        assert_eq!(empty.format(), ImageFormat::Unknown);
    }
}
