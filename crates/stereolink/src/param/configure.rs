// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! High-level camera configuration on top of the parameter channel.

use super::{ParameterChannel, ParameterId};
use crate::device::DeviceInfo;
use crate::error::{Error, Result};
use std::path::Path;

/// Named accessors for the camera's tuning parameters.
///
/// Thin wrapper over [`ParameterChannel`]; each accessor is one parameter
/// exchange. The underlying channel stays reachable for firmware-specific
/// parameters the named API does not cover.
pub struct DeviceConfigure {
    channel: ParameterChannel,
}

impl DeviceConfigure {
    pub fn connect(device: &DeviceInfo) -> Result<Self> {
        Ok(Self {
            channel: ParameterChannel::connect(device)?,
        })
    }

    pub fn open(address: &str, port: u16) -> Result<Self> {
        Ok(Self {
            channel: ParameterChannel::open(address, port)?,
        })
    }

    /// The raw channel, for parameters without a named accessor.
    pub fn channel(&self) -> &ParameterChannel {
        &self.channel
    }

    pub fn auto_exposure(&self) -> Result<bool> {
        self.channel.read_bool(ParameterId::AutoExposure as i32)
    }

    pub fn set_auto_exposure(&self, enabled: bool) -> Result<()> {
        self.channel
            .write_bool(ParameterId::AutoExposure as i32, enabled)
    }

    pub fn auto_exposure_mode(&self) -> Result<i32> {
        self.channel.read_int(ParameterId::AutoExposureMode as i32)
    }

    pub fn set_auto_exposure_mode(&self, mode: i32) -> Result<()> {
        self.channel
            .write_int(ParameterId::AutoExposureMode as i32, mode)
    }

    /// Manual exposure time in milliseconds; effective while auto exposure
    /// is off.
    pub fn manual_exposure(&self) -> Result<f64> {
        self.channel.read_double(ParameterId::ManualExposure as i32)
    }

    pub fn set_manual_exposure(&self, millis: f64) -> Result<()> {
        validate_exposure(millis)?;
        self.channel
            .write_double(ParameterId::ManualExposure as i32, millis)
    }

    pub fn resolution(&self) -> Result<i32> {
        self.channel.read_int(ParameterId::Resolution as i32)
    }

    pub fn set_resolution(&self, mode: i32) -> Result<()> {
        self.channel.write_int(ParameterId::Resolution as i32, mode)
    }

    pub fn manual_gain(&self) -> Result<f64> {
        self.channel.read_double(ParameterId::ManualGain as i32)
    }

    pub fn set_manual_gain(&self, gain: f64) -> Result<()> {
        self.channel
            .write_double(ParameterId::ManualGain as i32, gain)
    }

    pub fn auto_white_balance(&self) -> Result<bool> {
        self.channel.read_bool(ParameterId::AutoWhiteBalance as i32)
    }

    pub fn set_auto_white_balance(&self, enabled: bool) -> Result<()> {
        self.channel
            .write_bool(ParameterId::AutoWhiteBalance as i32, enabled)
    }

    pub fn auto_white_balance_mode(&self) -> Result<i32> {
        self.channel
            .read_int(ParameterId::AutoWhiteBalanceMode as i32)
    }

    pub fn set_auto_white_balance_mode(&self, mode: i32) -> Result<()> {
        self.channel
            .write_int(ParameterId::AutoWhiteBalanceMode as i32, mode)
    }

    pub fn manual_white_balance(&self) -> Result<f64> {
        self.channel
            .read_double(ParameterId::ManualWhiteBalance as i32)
    }

    pub fn set_manual_white_balance(&self, kelvin: f64) -> Result<()> {
        self.channel
            .write_double(ParameterId::ManualWhiteBalance as i32, kelvin)
    }

    pub fn led_mode(&self) -> Result<i32> {
        self.channel.read_int(ParameterId::LedMode as i32)
    }

    pub fn set_led_mode(&self, mode: i32) -> Result<()> {
        self.channel.write_int(ParameterId::LedMode as i32, mode)
    }

    pub fn led_brightness_level(&self) -> Result<i32> {
        self.channel.read_int(ParameterId::LedBrightnessLevel as i32)
    }

    pub fn set_led_brightness_level(&self, level: i32) -> Result<()> {
        self.channel
            .write_int(ParameterId::LedBrightnessLevel as i32, level)
    }

    /// Fetch the factory calibration blob.
    pub fn calibration_data(&self) -> Result<String> {
        self.channel.read_string(ParameterId::CalibrationData as i32)
    }

    /// Fetch the factory calibration blob and write it to a file.
    pub fn export_calibration<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = self.calibration_data()?;
        std::fs::write(path.as_ref(), data).map_err(Error::Io)?;
        log::info!(
            "[PARAM] calibration data exported to {}",
            path.as_ref().display()
        );
        Ok(())
    }
}

fn validate_exposure(millis: f64) -> Result<()> {
    if !millis.is_finite() || millis <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "exposure time must be a positive duration, got {}",
            millis
        )));
    }
    Ok(())
}
