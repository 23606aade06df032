//! IPv4 subnet arithmetic for zone network layouts

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use thiserror::Error;

/// A string that is not an IPv4 network in CIDR notation
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid CIDR {cidr:?}: {reason}")]
pub(crate) struct InvalidCidr {
    /// The rejected input
    pub cidr: String,
    /// What is wrong with it
    pub reason: String,
}

impl InvalidCidr {
    fn new(cidr: &str, reason: impl fmt::Display) -> Self {
        Self {
            cidr: cidr.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// An IPv4 network in CIDR notation, host bits cleared
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ipv4Cidr {
    base: u32,
    prefix: u8,
}

impl Ipv4Cidr {
    /// Prefix length
    pub(crate) fn prefix(&self) -> u8 {
        self.prefix
    }

    /// The `index`-th block of length `prefix` inside this network
    ///
    /// Blocks are laid out back to back starting at the network base.
    /// Returns `None` when the block would leave the network.
    pub(crate) fn subnet(&self, prefix: u8, index: u32) -> Option<Ipv4Cidr> {
        if prefix < self.prefix || prefix > 32 {
            return None;
        }
        let size = block_size(prefix);
        let offset = u64::from(index) * size;
        if offset + size > block_size(self.prefix) {
            return None;
        }
        Some(Ipv4Cidr {
            base: self.base + offset as u32,
            prefix,
        })
    }

    /// The block of length `prefix` directly after this one
    pub(crate) fn next(&self, prefix: u8) -> Option<Ipv4Cidr> {
        if prefix > 32 {
            return None;
        }
        let start = u64::from(self.base) + block_size(self.prefix);
        let end = start + block_size(prefix);
        if end > 1 << 32 {
            return None;
        }
        Some(Ipv4Cidr {
            base: start as u32,
            prefix,
        })
    }
}

fn block_size(prefix: u8) -> u64 {
    1u64 << (32 - u32::from(prefix))
}

impl FromStr for Ipv4Cidr {
    type Err = InvalidCidr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, prefix) = s
            .split_once('/')
            .ok_or_else(|| InvalidCidr::new(s, "missing prefix length"))?;
        let addr: Ipv4Addr = addr.parse().map_err(|e| InvalidCidr::new(s, e))?;
        let prefix: u8 = prefix.parse().map_err(|e| InvalidCidr::new(s, e))?;
        if prefix > 32 {
            return Err(InvalidCidr::new(s, "prefix length above 32"));
        }
        let mask = if prefix == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix))
        };
        Ok(Self {
            base: u32::from(addr) & mask,
            prefix,
        })
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", Ipv4Addr::from(self.base), self.prefix)
    }
}
