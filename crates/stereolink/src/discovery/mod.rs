// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! UDP broadcast device discovery.
//!
//! One round of discovery sends the fixed token to the broadcast address of
//! every capable interface on the well-known discovery port, then drains
//! responses with a short per-attempt receive timeout. Devices answer with a
//! framed announcement datagram; the responder's source IP becomes the
//! device address used for all later TCP channels.
//!
//! Discovery is best-effort end to end: a send failure on one interface is
//! logged and skipped, a malformed response is discarded, and zero
//! responders yields an empty list, not an error.

pub mod ifaces;

use crate::config::{
    DISCOVERY_PORT, DISCOVERY_RECV_TIMEOUT, DISCOVERY_TOKEN, FRAME_HEADER_SIZE,
    MAX_DISCOVERY_DATAGRAM,
};
use crate::device::DeviceInfo;
use crate::error::{Error, Result};
use crate::wire::{self, Announcement};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};

/// Broadcast-based device enumerator.
///
/// Each call to [`DeviceEnumeration::discover_devices`] runs one full
/// send-and-drain round on a fresh ephemeral port.
pub struct DeviceEnumeration {
    port: u16,
}

impl DeviceEnumeration {
    pub fn new() -> Self {
        Self {
            port: DISCOVERY_PORT,
        }
    }

    /// Discovery against a non-standard port, used by tests with a fake
    /// device bound to an ephemeral port.
    pub fn with_port(port: u16) -> Self {
        Self { port }
    }

    /// Run one discovery round and return every device that answered.
    pub fn discover_devices(&self) -> Result<Vec<DeviceInfo>> {
        let socket = open_discovery_socket()?;
        self.send_probes(&socket);
        Ok(collect_responses(&socket))
    }

    /// Best-effort probe fan-out. A send failure on one target must not
    /// abort the round; devices on other subnets may still answer.
    fn send_probes(&self, socket: &UdpSocket) {
        for target in ifaces::broadcast_targets() {
            let dest = SocketAddrV4::new(target, self.port);
            match socket.send_to(DISCOVERY_TOKEN, dest) {
                Ok(_) => log::debug!("[DISCOVERY] probe sent to {}", dest),
                Err(e) => log::warn!("[DISCOVERY] probe to {} failed: {}", dest, e),
            }
        }
    }
}

impl Default for DeviceEnumeration {
    fn default() -> Self {
        Self::new()
    }
}

/// UDP socket configured for discovery: broadcast enabled, short receive
/// timeout, bound to an ephemeral port.
fn open_discovery_socket() -> Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).map_err(Error::Io)?;
    socket.set_broadcast(true).map_err(Error::Io)?;
    socket
        .set_read_timeout(Some(DISCOVERY_RECV_TIMEOUT))
        .map_err(Error::Io)?;
    let bind_addr: SocketAddr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0).into();
    socket.bind(&bind_addr.into()).map_err(Error::Io)?;
    Ok(socket.into())
}

/// Drain announcement datagrams until the receive timeout fires.
fn collect_responses(socket: &UdpSocket) -> Vec<DeviceInfo> {
    let mut devices: Vec<DeviceInfo> = Vec::new();
    let mut buf = [0u8; MAX_DISCOVERY_DATAGRAM];

    loop {
        let (len, sender) = match socket.recv_from(&mut buf) {
            Ok(res) => res,
            Err(e) if is_timeout(&e) => break,
            Err(e) => {
                log::warn!("[DISCOVERY] receive error, ending round: {}", e);
                break;
            }
        };

        // A datagram too short to carry the length header means the
        // responder is not speaking this protocol; end the round.
        if len < FRAME_HEADER_SIZE {
            log::warn!("[DISCOVERY] runt datagram ({} bytes) from {}", len, sender);
            break;
        }

        match parse_announcement(&buf[..len], sender.ip()) {
            Ok(info) => {
                info.log_summary();
                // The same device may answer once per probed subnet.
                if !devices.iter().any(|d| d.ip_address() == info.ip_address()) {
                    devices.push(info);
                }
            }
            Err(e) => {
                log::warn!("[DISCOVERY] discarding datagram from {}: {}", sender, e);
            }
        }
    }

    devices
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Parse one announcement datagram: `[length header][announcement payload]`.
///
/// The declared length must match the payload actually received; UDP does
/// not fragment-reassemble for us, a mismatch means truncation or garbage.
pub(crate) fn parse_announcement(datagram: &[u8], sender: IpAddr) -> Result<DeviceInfo> {
    let mut header = [0u8; FRAME_HEADER_SIZE];
    header.copy_from_slice(&datagram[..FRAME_HEADER_SIZE]);
    let declared = i32::from_ne_bytes(header);

    if declared <= 0 {
        return Err(Error::Protocol(format!(
            "declared announcement length {} is not positive",
            declared
        )));
    }
    let payload = &datagram[FRAME_HEADER_SIZE..];
    if declared as usize != payload.len() {
        return Err(Error::Protocol(format!(
            "announcement length mismatch: declared {}, received {}",
            declared,
            payload.len()
        )));
    }

    let msg: Announcement = wire::decode_from_slice(payload)?;
    Ok(DeviceInfo::from_announcement(msg, sender))
}
