//! Validated IP addresses and prefix lengths.
//!
//! [`Address`] is tagged by family instead of relying on byte lengths, and
//! [`Prefix`] can only be built within the bounds of its family.

use crate::error::AnalyzeError;
use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Width of an IPv4 address in bits.
pub const IPV4_BITS: u8 = 32;
/// Width of an IPv6 address in bits.
pub const IPV6_BITS: u8 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
}

impl Address {
    /// Parses an IPv4 or IPv6 literal. No name resolution is attempted.
    ///
    /// IPv4-mapped IPv6 literals (`::ffff:a.b.c.d`) come back as [`Address::V4`].
    pub fn parse(input: &str) -> Result<Self, AnalyzeError> {
        let ip = IpAddr::from_str(input)
            .map_err(|_| AnalyzeError::InvalidAddress(input.to_string()))?;
        Ok(Self::from(ip))
    }

    /// Network of this address under `prefix`.
    ///
    /// Fails only when `prefix` is wider than the address family.
    pub fn network(&self, prefix: Prefix) -> Result<IpNetwork, AnalyzeError> {
        let network = match *self {
            Address::V4(ip) => Ipv4Network::new(ip, prefix.len()).map(IpNetwork::V4),
            Address::V6(ip) => Ipv6Network::new(ip, prefix.len()).map(IpNetwork::V6),
        };
        network.map_err(|_| AnalyzeError::InvalidPrefix(prefix.len()))
    }

    /// Clears every bit not covered by `prefix`.
    pub fn mask(&self, prefix: Prefix) -> Result<Address, AnalyzeError> {
        Ok(Address::network_address(&self.network(prefix)?))
    }

    /// First address of `network`.
    pub fn network_address(network: &IpNetwork) -> Address {
        match network {
            IpNetwork::V4(net) => Address::V4(net.network()),
            IpNetwork::V6(net) => Address::V6(net.network()),
        }
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => Address::V4(v4),
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => Address::V4(v4),
                None => Address::V6(v6),
            },
        }
    }
}

impl FromStr for Address {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::V4(ip) => ip.fmt(f),
            Address::V6(ip) => ip.fmt(f),
        }
    }
}

/// Number of leading network bits of a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Prefix(u8);

impl Prefix {
    /// Fixed prefix applied to every IPv6 address.
    pub const IPV6_DEFAULT: Prefix = Prefix(64);
    pub const CLASS_A: Prefix = Prefix(8);
    pub const CLASS_B: Prefix = Prefix(16);
    pub const CLASS_C: Prefix = Prefix(24);
    pub const HOST_V4: Prefix = Prefix(IPV4_BITS);

    pub fn v4(len: u8) -> Option<Self> {
        (len <= IPV4_BITS).then_some(Prefix(len))
    }

    pub fn v6(len: u8) -> Option<Self> {
        (len <= IPV6_BITS).then_some(Prefix(len))
    }

    pub const fn len(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
