// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! Length-prefix framing, the single protocol primitive of the stack.
//!
//! Every request/response exchange on the parameter and stream channels is
//! the same shape on the wire:
//!
//! ```text
//! +----------------+------------------------+
//! | length (4B,i32)| serialized payload     |
//! +----------------+------------------------+
//! ```
//!
//! The length header is a host-order `i32`: there is no endianness contract
//! on the header, both ends are assumed to run on the same architecture
//! family. A declared length that is not strictly positive, or that exceeds
//! the sanity cap, fails with [`Error::Protocol`] before any body read.

use crate::config::{FRAME_HEADER_SIZE, MAX_FRAME_SIZE};
use crate::error::{Error, Result};
use crate::transport::{recv_exact, send_exact};
use crate::wire::{self, WireDecode, WireEncode};
use std::io::{Read, Write};

/// Serialize a message and send it as one `[header][payload]` unit.
pub fn send_message<W, M>(writer: &mut W, msg: &M) -> Result<()>
where
    W: Write + ?Sized,
    M: WireEncode,
{
    let payload = wire::encode_to_vec(msg);
    let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    frame.extend_from_slice(&(payload.len() as i32).to_ne_bytes());
    frame.extend_from_slice(&payload);
    send_exact(writer, &frame)
}

/// Receive one framed payload: header, validation, then exactly that many
/// body bytes.
pub fn recv_frame<R: Read + ?Sized>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; FRAME_HEADER_SIZE];
    recv_exact(reader, &mut header)?;

    let declared = i32::from_ne_bytes(header);
    if declared <= 0 {
        return Err(Error::Protocol(format!(
            "declared frame length {} is not positive, nothing replied from device",
            declared
        )));
    }
    let len = declared as usize;
    if len > MAX_FRAME_SIZE {
        return Err(Error::Protocol(format!(
            "declared frame length {} exceeds the {} byte cap",
            len, MAX_FRAME_SIZE
        )));
    }

    let mut payload = vec![0u8; len];
    recv_exact(reader, &mut payload)?;
    Ok(payload)
}

/// Receive one framed payload and decode it into `M`.
pub fn recv_message<R, M>(reader: &mut R) -> Result<M>
where
    R: Read + ?Sized,
    M: WireDecode,
{
    let payload = recv_frame(reader)?;
    wire::decode_from_slice(&payload)
}

/// One request/response round trip over a bidirectional stream.
pub fn exchange<S, Req, Resp>(stream: &mut S, request: &Req) -> Result<Resp>
where
    S: Read + Write + ?Sized,
    Req: WireEncode,
    Resp: WireDecode,
{
    send_message(stream, request)?;
    recv_message(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{Announcement, StreamResponse, RESPONSE_OK};
    use crate::ProtocolVersion;
    use std::io::Cursor;

    fn sample_response() -> StreamResponse {
        StreamResponse {
            code: RESPONSE_OK,
            message: "started".into(),
            stream_id: 4,
        }
    }

    #[test]
    fn test_send_then_recv_roundtrip() {
        let mut buf = Vec::new();
        send_message(&mut buf, &sample_response()).unwrap();

        // header declares exactly the payload length
        let declared = i32::from_ne_bytes(buf[..4].try_into().unwrap());
        assert_eq!(declared as usize, buf.len() - 4);

        let decoded: StreamResponse = recv_message(&mut Cursor::new(buf)).unwrap();
        assert_eq!(decoded, sample_response());
    }

    #[test]
    fn test_zero_length_frame_is_a_protocol_error() {
        let header = 0i32.to_ne_bytes();
        match recv_frame(&mut Cursor::new(header.to_vec())) {
            Err(Error::Protocol(msg)) => assert!(msg.contains("not positive")),
            other => panic!("expected protocol error, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_length_frame_is_a_protocol_error() {
        let header = (-44i32).to_ne_bytes();
        assert!(matches!(
            recv_frame(&mut Cursor::new(header.to_vec())),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn test_oversized_frame_is_rejected_before_body_read() {
        let header = (i32::MAX).to_ne_bytes();
        // no body follows; the cap check must fire before any body read
        assert!(matches!(
            recv_frame(&mut Cursor::new(header.to_vec())),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn test_truncated_body_is_a_short_transfer() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&100i32.to_ne_bytes());
        buf.extend_from_slice(&[0u8; 10]); // 90 bytes missing
        assert!(matches!(
            recv_frame(&mut Cursor::new(buf)),
            Err(Error::ShortTransfer { .. })
        ));
    }

    #[test]
    fn test_exchange_against_in_memory_stream() {
        // a Read+Write "stream": reads serve a canned response, writes are kept
        struct Loopback {
            rx: Cursor<Vec<u8>>,
            tx: Vec<u8>,
        }
        impl std::io::Read for Loopback {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                self.rx.read(buf)
            }
        }
        impl std::io::Write for Loopback {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.tx.write(buf)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut canned = Vec::new();
        send_message(&mut canned, &sample_response()).unwrap();
        let mut stream = Loopback {
            rx: Cursor::new(canned),
            tx: Vec::new(),
        };

        let request = Announcement {
            device_name: "x".into(),
            model: "y".into(),
            firmware_version: "z".into(),
            protocol_version: ProtocolVersion::new(2, 0, 0),
            status: 1,
        };
        let response: StreamResponse = exchange(&mut stream, &request).unwrap();
        assert_eq!(response, sample_response());
        assert!(!stream.tx.is_empty());
    }
}
