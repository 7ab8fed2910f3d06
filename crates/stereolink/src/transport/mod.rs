// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! Byte-exact TCP transport primitives.
//!
//! Everything above this module assumes transfers either move exactly the
//! requested number of bytes or fail with [`Error::ShortTransfer`]; a partial
//! transfer is never reported as success. The send/receive helpers are
//! generic over `std::io::Write`/`Read` so the framing layer can be exercised
//! against in-memory streams in tests.

pub mod frame;

use crate::error::{Error, Result};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

/// Resolve an address/port pair to a single IPv4 endpoint.
///
/// Fails with [`Error::Resolution`] when the lookup yields no result or no
/// IPv4 address among the results (the device protocol is IPv4-only).
pub fn resolve(address: &str, port: u16) -> Result<SocketAddr> {
    let candidates = (address, port)
        .to_socket_addrs()
        .map_err(|e| Error::Resolution(format!("error resolving {}:{}: {}", address, port, e)))?;

    candidates
        .into_iter()
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| {
            Error::Resolution(format!("no IPv4 address found for {}:{}", address, port))
        })
}

/// Open a TCP connection to the resolved endpoint.
pub fn connect(addr: SocketAddr) -> Result<TcpStream> {
    let stream = TcpStream::connect(addr).map_err(Error::Connect)?;
    log::debug!("[TRANSPORT] connected to {}", addr);
    Ok(stream)
}

/// Send exactly `buf.len()` bytes or fail.
pub fn send_exact<W: Write + ?Sized>(writer: &mut W, buf: &[u8]) -> Result<()> {
    let required = buf.len();
    let mut sent = 0;
    while sent < required {
        match writer.write(&buf[sent..]) {
            Ok(0) => {
                return Err(Error::ShortTransfer {
                    transferred: sent,
                    required,
                    source: io::Error::new(io::ErrorKind::WriteZero, "peer stopped accepting data"),
                })
            }
            Ok(n) => sent += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                return Err(Error::ShortTransfer {
                    transferred: sent,
                    required,
                    source: e,
                })
            }
        }
    }
    Ok(())
}

/// Receive exactly `buf.len()` bytes or fail.
///
/// Loops over partial reads; a read of zero is a closed connection, not an
/// acceptable end-of-stream.
pub fn recv_exact<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let required = buf.len();
    let mut received = 0;
    while received < required {
        match reader.read(&mut buf[received..]) {
            Ok(0) => {
                return Err(Error::ShortTransfer {
                    transferred: received,
                    required,
                    source: io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed"),
                })
            }
            Ok(n) => received += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                return Err(Error::ShortTransfer {
                    transferred: received,
                    required,
                    source: e,
                })
            }
        }
    }
    Ok(())
}

/// Shut a connection down, ignoring "already closed" conditions.
///
/// Closing is idempotent by contract: tearing down a connection that is
/// already gone is a no-op, never an error.
pub fn shutdown(stream: &TcpStream) {
    if let Err(e) = stream.shutdown(Shutdown::Both) {
        log::debug!("[TRANSPORT] shutdown on closed connection ignored: {}", e);
    }
}
