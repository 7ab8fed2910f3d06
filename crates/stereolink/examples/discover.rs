// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

/// Device Discovery Example
///
/// Demonstrates:
/// - Running one broadcast discovery round
/// - Listing every camera that answered
/// - Checking protocol compatibility before connecting
use stereolink::DeviceEnumeration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== stereolink Device Discovery Example ===\n");

    let devices = DeviceEnumeration::new().discover_devices()?;
    if devices.is_empty() {
        println!("No camera answered. Check that a device is powered and on the same subnet.");
        return Ok(());
    }

    println!("Found {} device(s):\n", devices.len());
    for device in &devices {
        println!(
            "  {} ({}) at {} firmware {} protocol {} status {:?} compatible {}",
            device.device_name(),
            device.model(),
            device.ip_address(),
            device.firmware_version(),
            device.protocol_version(),
            device.status(),
            device.is_compatible()
        );
    }
    Ok(())
}
