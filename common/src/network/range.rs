//! # Address Range Model
//!
//! Provides continuous, inclusive ranges of IPv4 or IPv6 addresses and the
//! ordered, duplicate-free [`IpCollection`] that target expressions expand into.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use pnet::ipnetwork::{Ipv4Network, Ipv6Network};

use crate::error::ParseErrorKind;

pub const IPV4_BITS: u8 = 32;
pub const IPV6_BITS: u8 = 128;

/// Represents a continuous range of addresses of a single family, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpRange {
    pub start_addr: IpAddr,
    pub end_addr: IpAddr,
}

impl IpRange {
    /// Builds a range, rejecting mixed families and descending bounds.
    pub fn new(start_addr: IpAddr, end_addr: IpAddr) -> Result<Self, ParseErrorKind> {
        if start_addr.is_ipv4() != end_addr.is_ipv4() {
            return Err(ParseErrorKind::FamilyMismatch {
                start: start_addr,
                end: end_addr,
            });
        }
        if start_addr > end_addr {
            return Err(ParseErrorKind::DescendingRange {
                start: start_addr,
                end: end_addr,
            });
        }
        Ok(Self {
            start_addr,
            end_addr,
        })
    }

    pub fn single(addr: IpAddr) -> Self {
        Self {
            start_addr: addr,
            end_addr: addr,
        }
    }

    pub fn is_ipv4(&self) -> bool {
        self.start_addr.is_ipv4()
    }

    /// Number of addresses in the range. Saturates for `::/0`.
    pub fn len(&self) -> u128 {
        (to_u128(self.end_addr) - to_u128(self.start_addr)).saturating_add(1)
    }

    #[cfg(test)]
    pub fn contains(&self, addr: &IpAddr) -> bool {
        addr.is_ipv4() == self.is_ipv4() && *addr >= self.start_addr && *addr <= self.end_addr
    }

    pub fn iter(&self) -> IpRangeIter {
        IpRangeIter {
            next: to_u128(self.start_addr),
            last: to_u128(self.end_addr),
            ipv4: self.is_ipv4(),
            exhausted: false,
        }
    }
}

impl IntoIterator for IpRange {
    type Item = IpAddr;
    type IntoIter = IpRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over an [`IpRange`].
#[derive(Debug, Clone)]
pub struct IpRangeIter {
    next: u128,
    last: u128,
    ipv4: bool,
    exhausted: bool,
}

impl Iterator for IpRangeIter {
    type Item = IpAddr;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let current = self.next;
        if current == self.last {
            self.exhausted = true;
        } else {
            self.next += 1;
        }
        Some(from_u128(current, self.ipv4))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        let remaining = (self.last - self.next).saturating_add(1);
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// Creates a range from an address and a CIDR prefix (e.g. `192.168.1.0/24`).
///
/// Host bits of `ip` are masked off. The range covers the entire block,
/// network and broadcast addresses included.
pub fn cidr_range(ip: IpAddr, prefix: u8) -> Result<IpRange, ParseErrorKind> {
    let out_of_range = ParseErrorKind::PrefixOutOfRange {
        prefix: u32::from(prefix),
        max: max_prefix(&ip),
    };

    match ip {
        IpAddr::V4(v4) => {
            let network = Ipv4Network::new(v4, prefix).map_err(|_| out_of_range)?;
            Ok(IpRange {
                start_addr: IpAddr::V4(network.network()),
                end_addr: IpAddr::V4(network.broadcast()),
            })
        }
        IpAddr::V6(v6) => {
            let network = Ipv6Network::new(v6, prefix).map_err(|_| out_of_range)?;
            let start = u128::from(network.network());
            let end = start | !u128::from(network.mask());
            Ok(IpRange {
                start_addr: IpAddr::V6(Ipv6Addr::from(start)),
                end_addr: IpAddr::V6(Ipv6Addr::from(end)),
            })
        }
    }
}

/// Like [`cidr_range`], but only the usable host addresses.
///
/// IPv4 blocks up to `/30` lose their network and broadcast addresses, IPv6
/// blocks up to `/126` lose the subnet-router anycast address. Smaller blocks
/// are returned whole.
pub fn cidr_hosts(ip: IpAddr, prefix: u8) -> Result<IpRange, ParseErrorKind> {
    let block = cidr_range(ip, prefix)?;
    let start = to_u128(block.start_addr);
    let end = to_u128(block.end_addr);

    let (start, end) = match ip {
        IpAddr::V4(_) if prefix <= IPV4_BITS - 2 => (start + 1, end - 1),
        IpAddr::V6(_) if prefix <= IPV6_BITS - 2 => (start + 1, end),
        _ => (start, end),
    };

    Ok(IpRange {
        start_addr: from_u128(start, ip.is_ipv4()),
        end_addr: from_u128(end, ip.is_ipv4()),
    })
}

pub fn max_prefix(ip: &IpAddr) -> u8 {
    match ip {
        IpAddr::V4(_) => IPV4_BITS,
        IpAddr::V6(_) => IPV6_BITS,
    }
}

fn to_u128(ip: IpAddr) -> u128 {
    match ip {
        IpAddr::V4(v4) => u128::from(u32::from(v4)),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

fn from_u128(value: u128, ipv4: bool) -> IpAddr {
    if ipv4 {
        IpAddr::V4(Ipv4Addr::from(value as u32))
    } else {
        IpAddr::V6(Ipv6Addr::from(value))
    }
}

/// Ordered set of addresses to probe.
///
/// Iteration order is the order of first insertion; inserting an address that
/// is already present is a no-op.
#[derive(Debug, Clone, Default)]
pub struct IpCollection {
    addrs: Vec<IpAddr>,
    seen: HashSet<IpAddr>,
}

impl IpCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the address was not present yet.
    pub fn add_single(&mut self, addr: IpAddr) -> bool {
        if self.seen.insert(addr) {
            self.addrs.push(addr);
            true
        } else {
            false
        }
    }

    pub fn add_range(&mut self, range: &IpRange) {
        let (lower, _) = range.iter().size_hint();
        self.addrs.reserve(lower);
        for addr in range.iter() {
            self.add_single(addr);
        }
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    pub fn has_ipv4(&self) -> bool {
        self.addrs.iter().any(IpAddr::is_ipv4)
    }

    pub fn has_ipv6(&self) -> bool {
        self.addrs.iter().any(IpAddr::is_ipv6)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IpAddr> {
        self.addrs.iter()
    }

    pub fn as_slice(&self) -> &[IpAddr] {
        &self.addrs
    }

    pub fn into_vec(self) -> Vec<IpAddr> {
        self.addrs
    }
}

impl IntoIterator for IpCollection {
    type Item = IpAddr;
    type IntoIter = std::vec::IntoIter<IpAddr>;

    fn into_iter(self) -> Self::IntoIter {
        self.addrs.into_iter()
    }
}

impl<'a> IntoIterator for &'a IpCollection {
    type Item = &'a IpAddr;
    type IntoIter = std::slice::Iter<'a, IpAddr>;

    fn into_iter(self) -> Self::IntoIter {
        self.addrs.iter()
    }
}

impl FromIterator<IpAddr> for IpCollection {
    fn from_iter<T: IntoIterator<Item = IpAddr>>(iter: T) -> Self {
        let mut collection = Self::new();
        for addr in iter {
            collection.add_single(addr);
        }
        collection
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
