// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! Asynchronous stream tests: callback delivery from the reception thread.

use std::io::Write;
use std::net::TcpListener;
use std::sync::mpsc;
use std::time::Duration;

use stereolink::transport::frame;
use stereolink::wire::{StreamRequest, StreamResponse, RESPONSE_OK};
use stereolink::{
    AsyncStream, ImageChannel, ImageFormat, ImageMeta, ImageSet, ImageSetMeta, StreamChannel,
};

fn left_meta(timestamp: u64, size: u32) -> ImageSetMeta {
    ImageSetMeta {
        left: Some(ImageMeta {
            width: 720,
            height: 540,
            format: ImageFormat::Rgb,
            buffer_size: size,
            timestamp,
        }),
        ..Default::default()
    }
}

/// Fake device answering the start exchange, then pushing `frames` image
/// sets and closing the connection.
fn fake_device_pushing(frames: u64) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    std::thread::spawn(move || {
        let (mut conn, _) = listener.accept().unwrap();
        let _: StreamRequest = frame::recv_message(&mut conn).unwrap();
        frame::send_message(
            &mut conn,
            &StreamResponse {
                code: RESPONSE_OK,
                message: String::new(),
                stream_id: 1,
            },
        )
        .unwrap();

        for timestamp in 1..=frames {
            frame::send_message(&mut conn, &left_meta(timestamp, 16)).unwrap();
            conn.write_all(&[timestamp as u8; 16]).unwrap();
        }
        // closing the connection ends the session from the device side
    });
    port
}

#[test]
fn test_every_pushed_frame_reaches_the_listener_in_order() {
    let port = fake_device_pushing(3);
    let stream = AsyncStream::new(StreamChannel::with_endpoint("127.0.0.1", port));

    let (tx, rx) = mpsc::channel::<(u64, Vec<u8>)>();
    stream.set_listener(move |mut set: ImageSet| {
        let buffer = set.take_buffer(ImageChannel::Left).unwrap();
        tx.send((set.timestamp(), buffer)).unwrap();
    });

    stream.start().unwrap();

    let mut received = Vec::new();
    for _ in 0..3 {
        received.push(rx.recv_timeout(Duration::from_secs(5)).unwrap());
    }
    stream.stop();

    assert_eq!(received.len(), 3);
    for (index, (timestamp, buffer)) in received.iter().enumerate() {
        let expected = index as u64 + 1;
        assert_eq!(*timestamp, expected);
        assert_eq!(buffer, &vec![expected as u8; 16]);
    }
    // the device closed after three frames; no straggler may arrive
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn test_stop_unblocks_a_receive_in_progress() {
    // device that starts the session but never sends a frame
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    std::thread::spawn(move || {
        let (mut conn, _) = listener.accept().unwrap();
        let _: StreamRequest = frame::recv_message(&mut conn).unwrap();
        frame::send_message(
            &mut conn,
            &StreamResponse {
                code: RESPONSE_OK,
                message: String::new(),
                stream_id: 1,
            },
        )
        .unwrap();
        // hold the connection open; the client tears it down
        let _ = frame::recv_frame(&mut conn);
    });

    let stream = AsyncStream::new(StreamChannel::with_endpoint("127.0.0.1", port));
    stream.set_listener(|_set: ImageSet| {});
    stream.start().unwrap();
    assert!(stream.is_streaming());

    // give the worker time to block inside the receive
    std::thread::sleep(Duration::from_millis(50));

    // must return promptly instead of waiting for a frame that never comes
    stream.stop();
    assert!(!stream.is_streaming());
}

#[test]
fn test_no_delivery_after_stop() {
    let port = fake_device_pushing(1);
    let stream = AsyncStream::new(StreamChannel::with_endpoint("127.0.0.1", port));

    let (tx, rx) = mpsc::channel::<u64>();
    stream.set_listener(move |set: ImageSet| {
        tx.send(set.timestamp()).unwrap();
    });

    stream.start().unwrap();
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
    stream.stop();

    // after stop returns the worker has been joined; nothing can deliver
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_frames_without_listener_are_dropped_not_fatal() {
    let port = fake_device_pushing(2);
    let stream = AsyncStream::new(StreamChannel::with_endpoint("127.0.0.1", port));

    // no listener registered at all
    stream.start().unwrap();
    std::thread::sleep(Duration::from_millis(100));
    stream.stop();
    assert!(!stream.is_streaming());
}
