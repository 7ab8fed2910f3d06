// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

/// Stereo Capture Example
///
/// Demonstrates:
/// - Discovering a camera and opening its channels
/// - Reading and adjusting parameters through DeviceConfigure
/// - Receiving a burst of stereo frames through AsyncStream
use std::sync::mpsc;
use std::time::Duration;

use stereolink::stream::{STREAM_LEFT, STREAM_RIGHT};
use stereolink::{AsyncStream, DeviceConfigure, DeviceEnumeration, ImageSet, StreamChannel};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== stereolink Stereo Capture Example ===\n");

    let devices = DeviceEnumeration::new().discover_devices()?;
    let device = devices
        .iter()
        .find(|d| d.is_compatible())
        .ok_or("no compatible camera answered discovery")?;
    println!("[OK] Using {} at {}", device.device_name(), device.ip_address());

    // Parameter channel: make sure auto exposure is on
    let configure = DeviceConfigure::connect(device)?;
    if !configure.auto_exposure()? {
        configure.set_auto_exposure(true)?;
        println!("[OK] Enabled auto exposure");
    }

    // Stream channel wrapped for background reception
    let channel = StreamChannel::new(device)?;
    channel.set_stream_type(STREAM_LEFT | STREAM_RIGHT)?;
    let stream = AsyncStream::new(channel);

    let (tx, rx) = mpsc::channel::<(u64, u32, u32)>();
    stream.set_listener(move |set: ImageSet| {
        let _ = tx.send((set.timestamp(), set.width(), set.height()));
    });

    stream.start()?;
    println!("[OK] Streaming started, capturing 10 frames...\n");

    for index in 0..10 {
        match rx.recv_timeout(Duration::from_secs(5)) {
            Ok((timestamp, width, height)) => {
                println!("  frame {:2}: {}x{} t={}", index, width, height, timestamp);
            }
            Err(_) => {
                println!("  frame {:2}: timed out", index);
                break;
            }
        }
    }

    stream.stop();
    println!("\n[OK] Streaming stopped");
    Ok(())
}
