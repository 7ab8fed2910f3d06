// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! Message definitions for the discovery, parameter and stream exchanges.

use super::{Cursor, Encoder, WireDecode, WireEncode};
use crate::device::ProtocolVersion;
use crate::error::{Error, Result};

/// Status code a device puts in a response when the operation succeeded.
pub const RESPONSE_OK: u8 = 0;

/// Request-kind tag carried by [`StreamRequest`] for a start-stream exchange.
pub const STREAM_REQUEST_START: u8 = 1;

// ============================================================================
// Discovery
// ============================================================================

/// Device announcement carried in a discovery response datagram.
///
/// The sender's source IP is not part of the payload; discovery records it
/// from the datagram itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub device_name: String,
    pub model: String,
    pub firmware_version: String,
    pub protocol_version: ProtocolVersion,
    pub status: i32,
}

impl WireEncode for Announcement {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_string(&self.device_name);
        enc.put_string(&self.model);
        enc.put_string(&self.firmware_version);
        enc.put_u32(self.protocol_version.major);
        enc.put_u32(self.protocol_version.minor);
        enc.put_u32(self.protocol_version.patch);
        enc.put_i32(self.status);
    }
}

impl WireDecode for Announcement {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            device_name: cur.get_string()?,
            model: cur.get_string()?,
            firmware_version: cur.get_string()?,
            protocol_version: ProtocolVersion::new(cur.get_u32()?, cur.get_u32()?, cur.get_u32()?),
            status: cur.get_i32()?,
        })
    }
}

// ============================================================================
// Parameter channel
// ============================================================================

/// Operation kind of a parameter exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ParameterOp {
    ReadBool = 0,
    WriteBool = 1,
    ReadInt = 2,
    WriteInt = 3,
    ReadDouble = 4,
    WriteDouble = 5,
    ReadString = 6,
    WriteString = 7,
    ReadDeviceInfo = 8,
}

impl ParameterOp {
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            0 => Self::ReadBool,
            1 => Self::WriteBool,
            2 => Self::ReadInt,
            3 => Self::WriteInt,
            4 => Self::ReadDouble,
            5 => Self::WriteDouble,
            6 => Self::ReadString,
            7 => Self::WriteString,
            8 => Self::ReadDeviceInfo,
            _ => return None,
        })
    }
}

/// A typed parameter value, dispatched by pattern matching.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Bool(bool),
    Int(i32),
    Double(f64),
    Str(String),
}

impl ParameterValue {
    /// Human-readable name of the value type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::Str(_) => "string",
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) => 1,
            Self::Double(_) => 2,
            Self::Str(_) => 3,
        }
    }
}

/// Embedded payload of a parameter exchange: the id plus its typed value.
///
/// For read requests the value carries the type's default; the device fills
/// in the actual value in its response payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterPayload {
    pub id: i32,
    pub value: ParameterValue,
}

impl WireEncode for ParameterPayload {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_i32(self.id);
        enc.put_u8(self.value.tag());
        match &self.value {
            ParameterValue::Bool(v) => enc.put_u8(u8::from(*v)),
            ParameterValue::Int(v) => enc.put_i32(*v),
            ParameterValue::Double(v) => enc.put_f64(*v),
            ParameterValue::Str(v) => enc.put_string(v),
        }
    }
}

impl WireDecode for ParameterPayload {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let id = cur.get_i32()?;
        let tag = cur.get_u8()?;
        let value = match tag {
            0 => ParameterValue::Bool(cur.get_u8()? != 0),
            1 => ParameterValue::Int(cur.get_i32()?),
            2 => ParameterValue::Double(cur.get_f64()?),
            3 => ParameterValue::Str(cur.get_string()?),
            other => {
                return Err(Error::Protocol(format!(
                    "unknown parameter value tag {}",
                    other
                )))
            }
        };
        Ok(Self { id, value })
    }
}

/// Generic request envelope of the parameter channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRequest {
    pub op: ParameterOp,
    pub id: i32,
    /// Serialized [`ParameterPayload`] bytes (empty for device-info reads).
    pub payload: Vec<u8>,
}

impl WireEncode for ParameterRequest {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_i32(self.op as i32);
        enc.put_i32(self.id);
        enc.put_bytes(&self.payload);
    }
}

impl WireDecode for ParameterRequest {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let raw_op = cur.get_i32()?;
        let op = ParameterOp::from_i32(raw_op)
            .ok_or_else(|| Error::Protocol(format!("unknown parameter operation {}", raw_op)))?;
        Ok(Self {
            op,
            id: cur.get_i32()?,
            payload: cur.get_bytes()?,
        })
    }
}

/// Generic response envelope of the parameter channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterResponse {
    pub code: u8,
    pub message: String,
    /// Serialized [`ParameterPayload`] or [`DeviceDescriptor`] bytes.
    pub payload: Vec<u8>,
}

impl ParameterResponse {
    pub fn ok(&self) -> bool {
        self.code == RESPONSE_OK
    }
}

impl WireEncode for ParameterResponse {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_u8(self.code);
        enc.put_string(&self.message);
        enc.put_bytes(&self.payload);
    }
}

impl WireDecode for ParameterResponse {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            code: cur.get_u8()?,
            message: cur.get_string()?,
            payload: cur.get_bytes()?,
        })
    }
}

/// Detailed device information served over the parameter channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub device_name: String,
    pub model: String,
    pub serial_number: String,
    pub firmware_version: String,
    pub protocol_version: ProtocolVersion,
    pub status: i32,
}

impl WireEncode for DeviceDescriptor {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_string(&self.device_name);
        enc.put_string(&self.model);
        enc.put_string(&self.serial_number);
        enc.put_string(&self.firmware_version);
        enc.put_u32(self.protocol_version.major);
        enc.put_u32(self.protocol_version.minor);
        enc.put_u32(self.protocol_version.patch);
        enc.put_i32(self.status);
    }
}

impl WireDecode for DeviceDescriptor {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            device_name: cur.get_string()?,
            model: cur.get_string()?,
            serial_number: cur.get_string()?,
            firmware_version: cur.get_string()?,
            protocol_version: ProtocolVersion::new(cur.get_u32()?, cur.get_u32()?, cur.get_u32()?),
            status: cur.get_i32()?,
        })
    }
}

// ============================================================================
// Image stream channel
// ============================================================================

/// Request envelope of the stream channel. Only the start-stream exchange
/// exists today; `kind` leaves room for more without reframing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRequest {
    pub kind: u8,
    /// Bitmask of the image channels to include (see `stream::STREAM_LEFT` etc.).
    pub stream_type: i32,
    /// Requested pixel format (an `ImageFormat` discriminant).
    pub image_format: i32,
}

impl WireEncode for StreamRequest {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_u8(self.kind);
        enc.put_i32(self.stream_type);
        enc.put_i32(self.image_format);
    }
}

impl WireDecode for StreamRequest {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            kind: cur.get_u8()?,
            stream_type: cur.get_i32()?,
            image_format: cur.get_i32()?,
        })
    }
}

/// Response to a start-stream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamResponse {
    pub code: u8,
    pub message: String,
    pub stream_id: u32,
}

impl StreamResponse {
    pub fn ok(&self) -> bool {
        self.code == RESPONSE_OK
    }
}

impl WireEncode for StreamResponse {
    fn encode(&self, enc: &mut Encoder) {
        enc.put_u8(self.code);
        enc.put_string(&self.message);
        enc.put_u32(self.stream_id);
    }
}

impl WireDecode for StreamResponse {
    fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            code: cur.get_u8()?,
            message: cur.get_string()?,
            stream_id: cur.get_u32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{decode_from_slice, encode_to_vec};

    #[test]
    fn test_announcement_roundtrip() {
        let ann = Announcement {
            device_name: "lab-cam-3".into(),
            model: "VD-S210".into(),
            firmware_version: "1.4.7".into(),
            protocol_version: ProtocolVersion::new(2, 0, 1),
            status: 1,
        };
        let decoded: Announcement = decode_from_slice(&encode_to_vec(&ann)).unwrap();
        assert_eq!(decoded, ann);
    }

    #[test]
    fn test_parameter_payload_unknown_tag_fails() {
        let mut enc = Encoder::new();
        enc.put_i32(5);
        enc.put_u8(9); // no such value type
        let err = decode_from_slice::<ParameterPayload>(&enc.into_vec()).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn test_parameter_request_rejects_unknown_op() {
        let mut enc = Encoder::new();
        enc.put_i32(99);
        enc.put_i32(1);
        enc.put_bytes(&[]);
        assert!(decode_from_slice::<ParameterRequest>(&enc.into_vec()).is_err());
    }

    #[test]
    fn test_parameter_value_types_roundtrip() {
        for value in [
            ParameterValue::Bool(true),
            ParameterValue::Int(-7),
            ParameterValue::Double(0.125),
            ParameterValue::Str("calib".into()),
        ] {
            let payload = ParameterPayload { id: 3, value };
            let decoded: ParameterPayload = decode_from_slice(&encode_to_vec(&payload)).unwrap();
            assert_eq!(decoded, payload);
        }
    }

    #[test]
    fn test_stream_response_ok_flag() {
        let good = StreamResponse {
            code: RESPONSE_OK,
            message: String::new(),
            stream_id: 12,
        };
        let bad = StreamResponse {
            code: 2,
            message: "busy".into(),
            stream_id: 0,
        };
        assert!(good.ok());
        assert!(!bad.ok());
    }
}
