// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! Background-thread adapter delivering image sets to a callback.
//!
//! Wraps a [`StreamChannel`] with a worker thread that loops on
//! `recv_image_set` and hands every frame to the registered listener. The
//! callback runs on the worker thread: a slow callback applies backpressure
//! to reception, it never drops frames.

use super::StreamChannel;
use crate::error::Result;
use crate::imageset::ImageSet;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Receiver of image sets from an [`AsyncStream`] worker.
///
/// Implemented for free by any `Fn(ImageSet) + Send + Sync` closure. Each
/// delivered set owns its buffers exclusively.
pub trait ImageSetListener: Send + Sync {
    fn on_image_set(&self, set: ImageSet);
}

impl<F> ImageSetListener for F
where
    F: Fn(ImageSet) + Send + Sync,
{
    fn on_image_set(&self, set: ImageSet) {
        self(set)
    }
}

/// Asynchronous image stream: a [`StreamChannel`] plus a reception thread.
pub struct AsyncStream {
    channel: Arc<StreamChannel>,
    listener: Arc<ArcSwapOption<Arc<dyn ImageSetListener>>>,
    streaming: Arc<Mutex<bool>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncStream {
    pub fn new(channel: StreamChannel) -> Self {
        Self {
            channel: Arc::new(channel),
            listener: Arc::new(ArcSwapOption::const_empty()),
            streaming: Arc::new(Mutex::new(false)),
            worker: Mutex::new(None),
        }
    }

    /// Register the listener receiving every frame. Replaces any previous
    /// listener; takes effect from the next delivered frame. May be called
    /// while streaming.
    pub fn set_listener<L: ImageSetListener + 'static>(&self, listener: L) {
        self.listener.store(Some(Arc::new(Arc::new(listener))));
    }

    /// Remove the listener; subsequent frames are received and dropped.
    pub fn clear_listener(&self) {
        self.listener.store(None);
    }

    /// The wrapped channel, for stream-type and format configuration.
    pub fn channel(&self) -> &StreamChannel {
        &self.channel
    }

    /// Start the session and the reception worker.
    pub fn start(&self) -> Result<()> {
        let mut worker = self.worker.lock();
        self.channel.start()?;
        // mark streaming before the worker runs so a racing stop() after
        // this call cannot observe a started session with a cleared flag
        *self.streaming.lock() = true;

        let channel = Arc::clone(&self.channel);
        let listener = Arc::clone(&self.listener);
        let streaming = Arc::clone(&self.streaming);

        let handle = thread::Builder::new()
            .name("stereolink-stream".into())
            .spawn(move || reception_loop(&channel, &listener, &streaming));

        match handle {
            Ok(handle) => {
                *worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                *self.streaming.lock() = false;
                self.channel.stop();
                Err(crate::error::Error::Io(e))
            }
        }
    }

    /// Stop the session and join the worker.
    ///
    /// Ordering matters: the flag is cleared first so the worker knows the
    /// shutdown is deliberate, then the connection is closed to unblock a
    /// receive in progress, and only then is the thread joined. Idempotent.
    pub fn stop(&self) {
        *self.streaming.lock() = false;
        self.channel.stop();
        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                log::error!("[STREAM] reception worker panicked");
            }
        }
    }

    /// Whether the reception worker is meant to be running.
    pub fn is_streaming(&self) -> bool {
        *self.streaming.lock()
    }
}

impl Drop for AsyncStream {
    fn drop(&mut self) {
        self.stop();
    }
}

fn reception_loop(
    channel: &StreamChannel,
    listener: &ArcSwapOption<Arc<dyn ImageSetListener>>,
    streaming: &Mutex<bool>,
) {
    loop {
        if !*streaming.lock() {
            break;
        }
        match channel.recv_image_set(None) {
            Ok(set) => {
                // deliver synchronously; no listener means the frame is dropped
                if let Some(current) = listener.load_full() {
                    current.on_image_set(set);
                }
            }
            Err(e) => {
                // a receive error after stop() is the expected unblock path
                if *streaming.lock() {
                    log::warn!("[STREAM] reception ended: {}", e);
                    *streaming.lock() = false;
                }
                break;
            }
        }
    }
    log::debug!("[STREAM] reception worker exited");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_before_start_is_a_noop() {
        let stream = AsyncStream::new(StreamChannel::with_endpoint("127.0.0.1", 2003));
        stream.stop();
        assert!(!stream.is_streaming());
    }

    #[test]
    fn test_listener_can_be_swapped_and_cleared() {
        let stream = AsyncStream::new(StreamChannel::with_endpoint("127.0.0.1", 2003));
        assert!(stream.listener.load().is_none());

        stream.set_listener(|_set: ImageSet| {});
        assert!(stream.listener.load().is_some());

        stream.clear_listener();
        assert!(stream.listener.load().is_none());
    }

    #[test]
    fn test_start_failure_leaves_flag_cleared() {
        // nothing listens on this port; start() must fail and roll back
        let stream = AsyncStream::new(StreamChannel::with_endpoint("127.0.0.1", 1));
        assert!(stream.start().is_err());
        assert!(!stream.is_streaming());
        assert!(stream.worker.lock().is_none());
    }
}
