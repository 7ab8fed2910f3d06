// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! Device identity produced by discovery.

use crate::config::PROTOCOL_VERSION;
use crate::wire::Announcement;
use std::net::IpAddr;

/// Three-part protocol version advertised by devices and compiled into the
/// client (see [`crate::config::PROTOCOL_VERSION`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ProtocolVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Compatibility rule: major and minor must match the client exactly and
    /// the device patch must be greater than or equal to the client's.
    ///
    /// `self` is the device-advertised version, `client` the build constant.
    pub fn is_compatible_with(&self, client: &ProtocolVersion) -> bool {
        self.major == client.major && self.minor == client.minor && self.patch >= client.patch
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Operational status a device reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum DeviceStatus {
    Unknown = 0,
    Ok = 1,
    Degraded = 2,
    Error = 3,
    Updating = 4,
}

impl DeviceStatus {
    /// Lenient conversion: an unrecognized code maps to `Unknown` so that a
    /// newer device still shows up in discovery results.
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => Self::Ok,
            2 => Self::Degraded,
            3 => Self::Error,
            4 => Self::Updating,
            _ => Self::Unknown,
        }
    }
}

/// Immutable identity of a discovered device, valid for the session.
///
/// Connection endpoints for the parameter and stream channels are derived
/// from [`DeviceInfo::ip_address`] plus the well-known ports.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    device_name: String,
    model: String,
    ip_address: IpAddr,
    firmware_version: String,
    protocol_version: ProtocolVersion,
    status: DeviceStatus,
}

impl DeviceInfo {
    pub(crate) fn from_announcement(msg: Announcement, sender: IpAddr) -> Self {
        Self {
            device_name: msg.device_name,
            model: msg.model,
            ip_address: sender,
            firmware_version: msg.firmware_version,
            protocol_version: msg.protocol_version,
            status: DeviceStatus::from_i32(msg.status),
        }
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn ip_address(&self) -> IpAddr {
        self.ip_address
    }

    pub fn firmware_version(&self) -> &str {
        &self.firmware_version
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        self.protocol_version
    }

    pub fn status(&self) -> DeviceStatus {
        self.status
    }

    /// Whether this client build may open channels against the device.
    pub fn is_compatible(&self) -> bool {
        self.protocol_version.is_compatible_with(&PROTOCOL_VERSION)
    }

    /// Log a one-shot summary of the device, useful when listing discovery
    /// results from a tool.
    pub fn log_summary(&self) {
        log::info!(
            "[DISCOVERY] device={} model={} ip={} firmware={} protocol={} status={:?} compatible={}",
            self.device_name,
            self.model,
            self.ip_address,
            self.firmware_version,
            self.protocol_version,
            self.status,
            self.is_compatible()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device_with_version(version: ProtocolVersion) -> DeviceInfo {
        DeviceInfo {
            device_name: "cam".into(),
            model: "VD-S210".into(),
            ip_address: "192.168.1.40".parse().unwrap(),
            firmware_version: "1.0.0".into(),
            protocol_version: version,
            status: DeviceStatus::Ok,
        }
    }

    #[test]
    fn test_compatibility_matrix() {
        let client = ProtocolVersion::new(2, 0, 0);
        // exact match
        assert!(ProtocolVersion::new(2, 0, 0).is_compatible_with(&client));
        // device patch ahead is fine
        assert!(ProtocolVersion::new(2, 0, 5).is_compatible_with(&client));
        // device patch behind the client is not
        assert!(!ProtocolVersion::new(2, 0, 0).is_compatible_with(&ProtocolVersion::new(2, 0, 5)));
        // minor mismatch is not
        assert!(!ProtocolVersion::new(2, 0, 0).is_compatible_with(&ProtocolVersion::new(2, 1, 0)));
        // major mismatch is not
        assert!(!ProtocolVersion::new(3, 0, 0).is_compatible_with(&client));
    }

    #[test]
    fn test_device_info_compatibility_uses_build_constant() {
        let same = device_with_version(crate::config::PROTOCOL_VERSION);
        assert!(same.is_compatible());

        let old = device_with_version(ProtocolVersion::new(1, 0, 0));
        assert!(!old.is_compatible());
    }

    #[test]
    fn test_status_conversion_is_lenient() {
        assert_eq!(DeviceStatus::from_i32(1), DeviceStatus::Ok);
        assert_eq!(DeviceStatus::from_i32(77), DeviceStatus::Unknown);
    }

    #[test]
    fn test_from_announcement_records_sender_ip() {
        let ann = Announcement {
            device_name: "cam-7".into(),
            model: "VD-S110".into(),
            firmware_version: "0.9.2".into(),
            protocol_version: ProtocolVersion::new(2, 0, 0),
            status: 1,
        };
        let sender: IpAddr = "10.0.0.31".parse().unwrap();
        let info = DeviceInfo::from_announcement(ann, sender);
        assert_eq!(info.ip_address(), sender);
        assert_eq!(info.device_name(), "cam-7");
        assert_eq!(info.status(), DeviceStatus::Ok);
    }
}
