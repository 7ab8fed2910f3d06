// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! Well-known parameter identifiers.

/// Identifiers of the parameters a device exposes over the parameter channel.
///
/// The public read/write API takes raw `i32` ids so callers can address
/// firmware-specific parameters; ids are validated against this enumeration
/// before any network I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ParameterId {
    DeviceInformation = 0,
    AutoExposure = 1,
    AutoExposureMode = 2,
    ManualExposure = 3,
    Resolution = 4,
    ManualGain = 5,
    AutoWhiteBalance = 6,
    AutoWhiteBalanceMode = 7,
    ManualWhiteBalance = 8,
    LedMode = 9,
    LedBrightnessLevel = 10,
    CalibrationData = 11,
}

impl ParameterId {
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            0 => Self::DeviceInformation,
            1 => Self::AutoExposure,
            2 => Self::AutoExposureMode,
            3 => Self::ManualExposure,
            4 => Self::Resolution,
            5 => Self::ManualGain,
            6 => Self::AutoWhiteBalance,
            7 => Self::AutoWhiteBalanceMode,
            8 => Self::ManualWhiteBalance,
            9 => Self::LedMode,
            10 => Self::LedBrightnessLevel,
            11 => Self::CalibrationData,
            _ => return None,
        })
    }
}
