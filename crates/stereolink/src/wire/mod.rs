// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! Wire encoding for protocol messages.
//!
//! All message payloads use a compact little-endian encoding: fixed-width
//! integers via `to_le_bytes`, `f64` through its bit pattern, strings as a
//! `u32` length followed by UTF-8 bytes. Decoding is bounds-checked and
//! tolerates trailing bytes so newer devices can append fields.
//!
//! Note the frame *header* that precedes a payload on the wire is not part of
//! this module; see [`crate::transport::frame`].

mod messages;

pub use messages::{
    Announcement, DeviceDescriptor, ParameterOp, ParameterPayload, ParameterRequest,
    ParameterResponse, ParameterValue, StreamRequest, StreamResponse, RESPONSE_OK,
    STREAM_REQUEST_START,
};

use crate::error::{Error, Result};

/// Generate bounds-checked little-endian read methods.
macro_rules! impl_get_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> Result<$type> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.take($size)?);
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Bounds-checked reader over a received payload.
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::Protocol(format!(
                "unexpected end of message: need {} bytes at offset {}, {} remain",
                len,
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    impl_get_le!(get_u32, u32, 4);
    impl_get_le!(get_i32, i32, 4);
    impl_get_le!(get_u64, u64, 8);

    pub fn get_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.get_u64()?))
    }

    /// Read a `u32`-length-prefixed UTF-8 string.
    pub fn get_string(&mut self) -> Result<String> {
        let len = self.get_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::Protocol("string field is not valid UTF-8".into()))
    }

    /// Read a `u32`-length-prefixed byte blob.
    pub fn get_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.get_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }
}

/// Growable little-endian message writer.
#[derive(Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_f64(&mut self, value: f64) {
        self.put_u64(value.to_bits());
    }

    /// Write a `u32`-length-prefixed UTF-8 string.
    pub fn put_string(&mut self, value: &str) {
        self.put_u32(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Write a `u32`-length-prefixed byte blob.
    pub fn put_bytes(&mut self, value: &[u8]) {
        self.put_u32(value.len() as u32);
        self.buf.extend_from_slice(value);
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

/// Serialization half of a wire message. Encoding is infallible.
pub trait WireEncode {
    fn encode(&self, enc: &mut Encoder);
}

/// Deserialization half of a wire message.
pub trait WireDecode: Sized {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self>;
}

/// Serialize a message to an owned payload buffer.
pub fn encode_to_vec<M: WireEncode>(msg: &M) -> Vec<u8> {
    let mut enc = Encoder::new();
    msg.encode(&mut enc);
    enc.into_vec()
}

/// Decode a message from a payload buffer. Trailing bytes are ignored.
pub fn decode_from_slice<M: WireDecode>(buf: &[u8]) -> Result<M> {
    M::decode(&mut Cursor::new(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_rejects_overrun() {
        let mut cur = Cursor::new(&[0x01, 0x02]);
        assert!(cur.get_u32().is_err());
    }

    #[test]
    fn test_cursor_reads_in_sequence() {
        let mut enc = Encoder::new();
        enc.put_u8(7);
        enc.put_i32(-42);
        enc.put_f64(2.5);
        enc.put_string("left");
        let buf = enc.into_vec();

        let mut cur = Cursor::new(&buf);
        assert_eq!(cur.get_u8().unwrap(), 7);
        assert_eq!(cur.get_i32().unwrap(), -42);
        assert!((cur.get_f64().unwrap() - 2.5).abs() < f64::EPSILON);
        assert_eq!(cur.get_string().unwrap(), "left");
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn test_string_with_bogus_length_fails() {
        // declared length 100 but only 2 bytes follow
        let mut enc = Encoder::new();
        enc.put_u32(100);
        let mut buf = enc.into_vec();
        buf.extend_from_slice(b"ab");
        assert!(Cursor::new(&buf).get_string().is_err());
    }

    #[test]
    fn test_invalid_utf8_is_a_protocol_error() {
        let mut enc = Encoder::new();
        enc.put_u32(2);
        let mut buf = enc.into_vec();
        buf.extend_from_slice(&[0xFF, 0xFE]);
        match Cursor::new(&buf).get_string() {
            Err(Error::Protocol(_)) => {}
            other => panic!("expected protocol error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_trailing_bytes_are_tolerated() {
        // a newer peer may append fields after the ones we know
        let mut enc = Encoder::new();
        enc.put_i32(9);
        let mut buf = enc.into_vec();
        buf.extend_from_slice(&[0xAA; 16]);

        struct JustAnInt(i32);
        impl WireDecode for JustAnInt {
            fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
                Ok(JustAnInt(cur.get_i32()?))
            }
        }
        let msg: JustAnInt = decode_from_slice(&buf).unwrap();
        assert_eq!(msg.0, 9);
    }
}
