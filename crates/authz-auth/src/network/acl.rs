//! IPv4 admission ruleset built from textual entries.
//!
//! Accepted entry forms:
//! - `*`, `0.0.0.0`, `0.0.0.0/0`: allow everything, other entries are dropped
//! - `A.B.C.D/N`: CIDR block
//! - `A.B.C.D|E.F.G.H`: inclusive range, swapped if given in reverse
//! - `A.B.C.D`: single host
//!
//! The ruleset is immutable after construction and safe to share without locking.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};

use tracing::warn;

/// A CIDR block stored as masked network plus mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cidr {
    network: u32,
    mask: u32,
}

impl Cidr {
    fn contains(&self, addr: u32) -> bool {
        addr & self.mask == self.network
    }
}

/// Parsed network admission ruleset.
#[derive(Debug, Clone, Default)]
pub struct NetworkAcl {
    /// Short-circuits every check when set.
    allow_all: bool,
    /// Single hosts.
    hosts: HashSet<u32>,
    /// CIDR blocks.
    blocks: Vec<Cidr>,
    /// Inclusive `(low, high)` ranges.
    ranges: Vec<(u32, u32)>,
}

impl NetworkAcl {
    /// Build a ruleset; malformed entries are logged and skipped.
    pub fn new<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut acl = Self::default();

        for raw in entries {
            let entry = raw.as_ref().trim();
            if entry.is_empty() {
                continue;
            }

            if matches!(entry, "*" | "0.0.0.0" | "0.0.0.0/0") {
                return Self {
                    allow_all: true,
                    ..Self::default()
                };
            }

            let parsed = if let Some((addr, prefix)) = entry.split_once('/') {
                parse_cidr(addr, prefix).map(|block| acl.blocks.push(block))
            } else if let Some((start, end)) = entry.split_once('|') {
                parse_range(start, end).map(|range| acl.ranges.push(range))
            } else {
                parse_v4(entry).map(|host| {
                    acl.hosts.insert(host);
                })
            };

            if parsed.is_none() {
                warn!(entry, "Skipping malformed allowed_networks entry");
            }
        }

        acl
    }

    /// Whether every address is admitted.
    pub fn allows_all(&self) -> bool {
        self.allow_all
    }

    /// Check a textual address. Empty, unparseable, and IPv6 addresses are rejected.
    pub fn is_allowed(&self, address: &str) -> bool {
        if self.allow_all {
            return true;
        }
        match parse_v4(address.trim()) {
            Some(addr) => self.matches(addr),
            None => false,
        }
    }

    /// Check a socket address.
    pub fn is_allowed_ip(&self, ip: IpAddr) -> bool {
        if self.allow_all {
            return true;
        }
        match ip {
            IpAddr::V4(v4) => self.matches(u32::from(v4)),
            IpAddr::V6(_) => false,
        }
    }

    fn matches(&self, addr: u32) -> bool {
        self.hosts.contains(&addr)
            || self.blocks.iter().any(|block| block.contains(addr))
            || self
                .ranges
                .iter()
                .any(|&(low, high)| (low..=high).contains(&addr))
    }
}

fn parse_v4(value: &str) -> Option<u32> {
    value.trim().parse::<Ipv4Addr>().ok().map(u32::from)
}

fn parse_cidr(addr: &str, prefix: &str) -> Option<Cidr> {
    let addr = parse_v4(addr)?;
    let prefix: u32 = prefix.trim().parse().ok()?;
    if prefix > 32 {
        return None;
    }
    let mask = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix)
    };
    Some(Cidr {
        network: addr & mask,
        mask,
    })
}

fn parse_range(start: &str, end: &str) -> Option<(u32, u32)> {
    let start = parse_v4(start)?;
    let end = parse_v4(end)?;
    Some((start.min(end), start.max(end)))
}
