//! Global IPv6 address discovery
//!
//! Discovery is a fresh `getifaddrs` snapshot on every call; nothing is
//! cached between calls. An address qualifies when it is IPv6, not an
//! IPv4-mapped form, and outside the loopback, link-local and unique-local
//! ranges. The first qualifying address wins, in interface enumeration order
//! then address order within an interface.

use std::ffi::CStr;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use anyhow::{Context as _, Result};
use tracing::debug;

//==============================================================================
// Types
//==============================================================================

/// Addresses bound to one interface, in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddresses {
    pub name: String,
    pub addrs: Vec<IpAddr>,
}

/// Derived facts about a candidate address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressFacts {
    pub is_ipv6: bool,
    pub is_ipv4_mapped: bool,
    pub is_loopback: bool,
    pub is_link_local: bool,
    pub is_unique_local: bool,
}

impl AddressFacts {
    /// True for addresses routable on the public internet.
    pub fn is_global_unicast(&self) -> bool {
        self.is_ipv6
            && !self.is_ipv4_mapped
            && !self.is_loopback
            && !self.is_link_local
            && !self.is_unique_local
    }
}

/// Source of the address to publish.
///
/// `Err` means interface enumeration itself failed; `Ok(None)` means the
/// enumeration succeeded but nothing qualified.
pub trait AddressSource: Send + Sync {
    fn find_public_ipv6(&self) -> Result<Option<String>>;
}

/// Production resolver backed by the host's live interface table.
#[derive(Debug, Default, Clone)]
pub struct SystemResolver;

impl AddressSource for SystemResolver {
    fn find_public_ipv6(&self) -> Result<Option<String>> {
        let interfaces = snapshot_interfaces()?;
        Ok(select_public_ipv6(&interfaces).map(|ip| ip.to_string()))
    }
}

//==============================================================================
// Classification and selection
//==============================================================================

/// Classifies one candidate address.
pub fn classify(addr: IpAddr) -> AddressFacts {
    match addr {
        IpAddr::V4(_) => AddressFacts {
            is_ipv6: false,
            is_ipv4_mapped: false,
            is_loopback: false,
            is_link_local: false,
            is_unique_local: false,
        },
        IpAddr::V6(v6) => {
            let segments = v6.segments();
            AddressFacts {
                is_ipv6: true,
                // ::ffff:a.b.c.d
                is_ipv4_mapped: matches!(segments, [0, 0, 0, 0, 0, 0xffff, _, _]),
                is_loopback: v6.is_loopback(),
                // fe80::/10
                is_link_local: segments[0] & 0xffc0 == 0xfe80,
                // fc00::/7 (RFC 4193)
                is_unique_local: segments[0] & 0xfe00 == 0xfc00,
            }
        }
    }
}

/// Picks the first global unicast IPv6 address from a snapshot.
pub fn select_public_ipv6(interfaces: &[InterfaceAddresses]) -> Option<Ipv6Addr> {
    for iface in interfaces {
        for addr in &iface.addrs {
            if let IpAddr::V6(v6) = addr {
                if classify(*addr).is_global_unicast() {
                    debug!("selected {} on interface {}", v6, iface.name);
                    return Some(*v6);
                }
            }
        }
    }
    None
}

//==============================================================================
// System snapshot
//==============================================================================

/// Reads the current interface table via `getifaddrs`.
///
/// Entries without an address, or with an unsupported family, are skipped.
/// Interfaces keep their first-seen position; additional addresses of an
/// already-seen interface append to its group.
pub fn snapshot_interfaces() -> Result<Vec<InterfaceAddresses>> {
    let mut ifap: *mut libc::ifaddrs = std::ptr::null_mut();
    if unsafe { libc::getifaddrs(&mut ifap) } != 0 {
        return Err(std::io::Error::last_os_error()).context("enumerate network interfaces");
    }

    let mut interfaces: Vec<InterfaceAddresses> = Vec::new();
    let mut cursor = ifap;
    while !cursor.is_null() {
        let entry = unsafe { &*cursor };
        cursor = entry.ifa_next;

        if entry.ifa_addr.is_null() || entry.ifa_name.is_null() {
            continue;
        }
        let name = unsafe { CStr::from_ptr(entry.ifa_name) }
            .to_string_lossy()
            .into_owned();
        let family = unsafe { (*entry.ifa_addr).sa_family } as i32;
        let addr = match family {
            libc::AF_INET => {
                let sa = unsafe { &*(entry.ifa_addr as *const libc::sockaddr_in) };
                IpAddr::V4(Ipv4Addr::from(u32::from_be(sa.sin_addr.s_addr)))
            }
            libc::AF_INET6 => {
                let sa = unsafe { &*(entry.ifa_addr as *const libc::sockaddr_in6) };
                IpAddr::V6(Ipv6Addr::from(sa.sin6_addr.s6_addr))
            }
            _ => continue,
        };

        match interfaces.iter_mut().find(|iface| iface.name == name) {
            Some(existing) => existing.addrs.push(addr),
            None => interfaces.push(InterfaceAddresses {
                name,
                addrs: vec![addr],
            }),
        }
    }

    unsafe { libc::freeifaddrs(ifap) };
    Ok(interfaces)
}

//==============================================================================
// Tests
//==============================================================================
