// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 veridepth.io

//! Per-interface IPv4 broadcast address enumeration.
//!
//! Discovery sends its probe to the directed broadcast address of every
//! broadcast-capable interface, so devices on all attached subnets hear it,
//! not only those reachable via 255.255.255.255.

use std::io;
use std::net::Ipv4Addr;

/// One broadcast-capable IPv4 interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastInterface {
    pub name: String,
    pub addr: Ipv4Addr,
    /// Directed broadcast address, derived as `addr | !netmask`.
    pub broadcast: Ipv4Addr,
}

/// Enumerate IPv4 interfaces that are up and broadcast-capable.
///
/// Loopback is skipped; the limited broadcast fallback covers the case where
/// nothing else is available.
#[cfg(unix)]
pub fn broadcast_interfaces() -> io::Result<Vec<BroadcastInterface>> {
    use std::ffi::CStr;

    let mut out = Vec::new();
    let mut ifaddrs: *mut libc::ifaddrs = std::ptr::null_mut();

    // SAFETY:
    // - `ifaddrs` is a valid pointer to a null pointer, which getifaddrs will populate
    // - getifaddrs is a standard POSIX function that allocates and returns a linked list
    // - The returned list must be freed with freeifaddrs (done at end of function)
    let ret = unsafe { libc::getifaddrs(&mut ifaddrs) };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }

    let mut ifa = ifaddrs;
    while !ifa.is_null() {
        // SAFETY:
        // - `ifa` is checked to be non-null in the while condition
        // - The pointer comes from getifaddrs which returns valid ifaddrs structures
        // - The structure remains valid until freeifaddrs is called
        let entry = unsafe { &*ifa };

        let flags = entry.ifa_flags as i32;
        let usable = flags & libc::IFF_UP != 0
            && flags & libc::IFF_BROADCAST != 0
            && flags & libc::IFF_LOOPBACK == 0;

        if usable && !entry.ifa_addr.is_null() && !entry.ifa_netmask.is_null() {
            // SAFETY:
            // - `entry.ifa_addr` is checked non-null above
            // - The sockaddr is allocated by getifaddrs and valid until freeifaddrs
            // - We only read sa_family to determine the address type
            let family = unsafe { (*entry.ifa_addr).sa_family };
            if i32::from(family) == libc::AF_INET {
                let sockaddr_in = entry.ifa_addr as *const libc::sockaddr_in;
                // SAFETY:
                // - sa_family == AF_INET guarantees this is a sockaddr_in structure
                // - The pointer is valid as it comes from getifaddrs
                // - sockaddr_in is properly aligned (same as sockaddr)
                let addr_bits = u32::from_be(unsafe { (*sockaddr_in).sin_addr.s_addr });

                let mask_in = entry.ifa_netmask as *const libc::sockaddr_in;
                // SAFETY:
                // - `entry.ifa_netmask` is checked non-null above and shares the
                //   address family of `ifa_addr` on every POSIX platform
                // - The pointer is valid as it comes from getifaddrs
                let mask_bits = u32::from_be(unsafe { (*mask_in).sin_addr.s_addr });

                // SAFETY:
                // - `entry.ifa_name` is guaranteed non-null and NUL-terminated by getifaddrs
                // - The string data is valid for the lifetime of the ifaddrs list
                // - We immediately convert to owned String, so no lifetime issues
                let name = unsafe { CStr::from_ptr(entry.ifa_name) }
                    .to_string_lossy()
                    .into_owned();

                out.push(BroadcastInterface {
                    name,
                    addr: Ipv4Addr::from(addr_bits),
                    broadcast: Ipv4Addr::from(addr_bits | !mask_bits),
                });
            }
        }

        ifa = entry.ifa_next;
    }

    // SAFETY:
    // - `ifaddrs` is the pointer returned by getifaddrs at the start of the function
    // - The pointer is still valid (not freed yet)
    // - freeifaddrs is the correct function to free memory allocated by getifaddrs
    unsafe { libc::freeifaddrs(ifaddrs) };

    Ok(out)
}

#[cfg(not(unix))]
pub fn broadcast_interfaces() -> io::Result<Vec<BroadcastInterface>> {
    // No enumeration on this platform; the caller falls back to the limited
    // broadcast address.
    Ok(Vec::new())
}

/// Broadcast destinations discovery should probe.
///
/// The limited broadcast address is always included so discovery still works
/// when enumeration fails or yields nothing.
pub fn broadcast_targets() -> Vec<Ipv4Addr> {
    let mut targets = vec![Ipv4Addr::BROADCAST];
    match broadcast_interfaces() {
        Ok(ifaces) => {
            for iface in ifaces {
                log::debug!(
                    "[DISCOVERY] interface {} addr={} broadcast={}",
                    iface.name,
                    iface.addr,
                    iface.broadcast
                );
                if !targets.contains(&iface.broadcast) {
                    targets.push(iface.broadcast);
                }
            }
        }
        Err(e) => {
            log::warn!("[DISCOVERY] interface enumeration failed: {}", e);
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_always_include_limited_broadcast() {
        let targets = broadcast_targets();
        assert!(targets.contains(&Ipv4Addr::BROADCAST));
    }

    #[test]
    fn test_targets_are_deduplicated() {
        let targets = broadcast_targets();
        let mut seen = targets.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), targets.len());
    }

    #[cfg(unix)]
    #[test]
    fn test_enumeration_skips_loopback() {
        let ifaces = broadcast_interfaces().unwrap();
        assert!(ifaces.iter().all(|i| !i.addr.is_loopback()));
    }
}
