// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! Parameter channel: typed read/write exchanges over one persistent TCP
//! connection.
//!
//! Every exchange is one framed request followed by one framed response. A
//! mutex serializes exchanges so concurrent callers can never interleave
//! their request/response pairs on the shared connection; blocked callers
//! wait, they do not fail.

pub mod configure;
pub mod ids;

pub use configure::DeviceConfigure;
pub use ids::ParameterId;

use crate::config::PARAMETER_PORT;
use crate::device::DeviceInfo;
use crate::error::{Error, Result};
use crate::transport::{self, frame};
use crate::wire::{
    self, DeviceDescriptor, ParameterOp, ParameterPayload, ParameterRequest, ParameterResponse,
    ParameterValue,
};
use parking_lot::Mutex;
use std::net::TcpStream;

/// Connection to a device's parameter channel.
pub struct ParameterChannel {
    stream: Mutex<TcpStream>,
}

impl ParameterChannel {
    /// Connect to a discovered device on the well-known parameter port.
    ///
    /// Refuses incompatible devices before any connection attempt.
    pub fn connect(device: &DeviceInfo) -> Result<Self> {
        if !device.is_compatible() {
            return Err(Error::Incompatible {
                device: device.protocol_version(),
            });
        }
        Self::open(&device.ip_address().to_string(), PARAMETER_PORT)
    }

    /// Connect to an explicit endpoint, bypassing discovery. Used by tools
    /// given a known address and by tests against a local fake device.
    pub fn open(address: &str, port: u16) -> Result<Self> {
        let addr = transport::resolve(address, port)?;
        let stream = transport::connect(addr)?;
        log::info!("[PARAM] channel open to {}", addr);
        Ok(Self {
            stream: Mutex::new(stream),
        })
    }

    pub fn read_bool(&self, id: i32) -> Result<bool> {
        match self.read(ParameterOp::ReadBool, id, ParameterValue::Bool(false))? {
            ParameterValue::Bool(v) => Ok(v),
            other => Err(type_mismatch("bool", &other)),
        }
    }

    pub fn write_bool(&self, id: i32, value: bool) -> Result<()> {
        self.write(ParameterOp::WriteBool, id, ParameterValue::Bool(value))
    }

    pub fn read_int(&self, id: i32) -> Result<i32> {
        match self.read(ParameterOp::ReadInt, id, ParameterValue::Int(0))? {
            ParameterValue::Int(v) => Ok(v),
            other => Err(type_mismatch("int", &other)),
        }
    }

    pub fn write_int(&self, id: i32, value: i32) -> Result<()> {
        self.write(ParameterOp::WriteInt, id, ParameterValue::Int(value))
    }

    pub fn read_double(&self, id: i32) -> Result<f64> {
        match self.read(ParameterOp::ReadDouble, id, ParameterValue::Double(0.0))? {
            ParameterValue::Double(v) => Ok(v),
            other => Err(type_mismatch("double", &other)),
        }
    }

    pub fn write_double(&self, id: i32, value: f64) -> Result<()> {
        self.write(ParameterOp::WriteDouble, id, ParameterValue::Double(value))
    }

    pub fn read_string(&self, id: i32) -> Result<String> {
        match self.read(
            ParameterOp::ReadString,
            id,
            ParameterValue::Str(String::new()),
        )? {
            ParameterValue::Str(v) => Ok(v),
            other => Err(type_mismatch("string", &other)),
        }
    }

    pub fn write_string(&self, id: i32, value: &str) -> Result<()> {
        self.write(
            ParameterOp::WriteString,
            id,
            ParameterValue::Str(value.to_owned()),
        )
    }

    /// Fetch the detailed device descriptor (serial number included, unlike
    /// the discovery announcement).
    pub fn read_device_descriptor(&self) -> Result<DeviceDescriptor> {
        let response = self.exchange(ParameterRequest {
            op: ParameterOp::ReadDeviceInfo,
            id: ParameterId::DeviceInformation as i32,
            payload: Vec::new(),
        })?;
        wire::decode_from_slice(&response.payload).map_err(decode_hint)
    }

    fn read(&self, op: ParameterOp, id: i32, default: ParameterValue) -> Result<ParameterValue> {
        validate_id(id)?;
        // read requests carry the type's default; the device echoes the id
        // and fills in the actual value
        let payload = wire::encode_to_vec(&ParameterPayload { id, value: default });
        let response = self.exchange(ParameterRequest { op, id, payload })?;
        let decoded: ParameterPayload =
            wire::decode_from_slice(&response.payload).map_err(decode_hint)?;
        Ok(decoded.value)
    }

    fn write(&self, op: ParameterOp, id: i32, value: ParameterValue) -> Result<()> {
        validate_id(id)?;
        let payload = wire::encode_to_vec(&ParameterPayload { id, value });
        self.exchange(ParameterRequest { op, id, payload })?;
        Ok(())
    }

    /// One serialized request/response round trip. Holds the connection lock
    /// for the whole exchange.
    fn exchange(&self, request: ParameterRequest) -> Result<ParameterResponse> {
        let mut stream = self.stream.lock();
        let response: ParameterResponse =
            frame::exchange(&mut *stream, &request).map_err(decode_hint)?;
        if !response.ok() {
            return Err(Error::Device(response.message));
        }
        Ok(response)
    }
}

fn validate_id(id: i32) -> Result<()> {
    match ParameterId::from_i32(id) {
        Some(_) => Ok(()),
        None => Err(Error::InvalidParameter(id)),
    }
}

fn type_mismatch(expected: &str, got: &ParameterValue) -> Error {
    Error::Protocol(format!(
        "device answered with a {} value where {} was expected",
        got.type_name(),
        expected
    ))
}

/// A response that fails to decode usually means the two ends disagree on
/// the message layout; point the user at the version check.
fn decode_hint(err: Error) -> Error {
    match err {
        Error::Protocol(msg) => Error::Protocol(format!(
            "{}, check if protocol version is match",
            msg
        )),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_id_fails_before_any_io() {
        // no connection exists on this port; validation must fire first
        let channel = ParameterChannel {
            stream: Mutex::new(match std::net::TcpListener::bind("127.0.0.1:0") {
                Ok(listener) => {
                    let addr = listener.local_addr().unwrap();
                    let client = TcpStream::connect(addr).unwrap();
                    let _server = listener.accept().unwrap();
                    client
                }
                Err(e) => panic!("loopback listener failed: {}", e),
            }),
        };
        assert!(matches!(
            channel.read_int(99),
            Err(Error::InvalidParameter(99))
        ));
        assert!(matches!(
            channel.write_bool(-3, true),
            Err(Error::InvalidParameter(-3))
        ));
    }

    #[test]
    fn test_decode_hint_only_rewrites_protocol_errors() {
        let hinted = decode_hint(Error::Protocol("bad tag".into()));
        assert!(hinted.to_string().contains("protocol version"));

        let untouched = decode_hint(Error::Device("nope".into()));
        assert!(!untouched.to_string().contains("protocol version"));
    }
}
