//! Address classification and subnet derivation.
//!
//! Subnets follow the legacy classful convention: an IPv4 address is masked
//! with the default mask of its class (A /8, B /16, C /24, D and E /32) and
//! the gateway is the first address after the network. IPv6 addresses always
//! get a /64 and have no gateway.
//!
//! Everything here is pure. The only reachable failure is an unparseable input.

use crate::address::{Address, Prefix};
use crate::error::AnalyzeError;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Reported in place of fields that only exist for IPv4.
pub const IPV6_NOT_APPLICABLE: &str = "N/A for IPv6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressClass {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D (Multicast)")]
    D,
    #[serde(rename = "E (Reserved)")]
    E,
    #[serde(rename = "Unknown")]
    Unknown,
    #[serde(rename = "IPv6")]
    IPv6,
}

impl AddressClass {
    pub const fn label(self) -> &'static str {
        match self {
            AddressClass::A => "A",
            AddressClass::B => "B",
            AddressClass::C => "C",
            AddressClass::D => "D (Multicast)",
            AddressClass::E => "E (Reserved)",
            AddressClass::Unknown => "Unknown",
            AddressClass::IPv6 => "IPv6",
        }
    }
}

impl fmt::Display for AddressClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything derived from a single address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetDescriptor {
    address: Address,
    network: IpNetwork,
    prefix: Prefix,
    gateway: Option<Address>,
    class: AddressClass,
    is_private: bool,
}

impl SubnetDescriptor {
    pub fn address(&self) -> Address {
        self.address
    }

    /// First address of the subnet.
    pub fn network(&self) -> Address {
        Address::network_address(&self.network)
    }

    pub fn ip_network(&self) -> IpNetwork {
        self.network
    }

    pub fn prefix(&self) -> Prefix {
        self.prefix
    }

    /// `None` for IPv6.
    pub fn gateway(&self) -> Option<Address> {
        self.gateway
    }

    pub fn class(&self) -> AddressClass {
        self.class
    }

    pub fn is_private(&self) -> bool {
        self.is_private
    }

    /// CIDR notation, `network/prefix`.
    pub fn subnet(&self) -> String {
        format!("{}/{}", self.network(), self.prefix)
    }

    pub fn gateway_text(&self) -> String {
        match self.gateway {
            Some(gateway) => gateway.to_string(),
            None => IPV6_NOT_APPLICABLE.to_string(),
        }
    }
}

/// Parses `input` and derives its descriptor.
pub fn analyze(input: &str) -> Result<SubnetDescriptor, AnalyzeError> {
    let address = Address::parse(input)?;
    describe(address)
}

/// Derives the descriptor of an already validated address.
pub fn describe(address: Address) -> Result<SubnetDescriptor, AnalyzeError> {
    let prefix = default_prefix(&address);
    let network = address.network(prefix)?;

    Ok(SubnetDescriptor {
        address,
        network,
        prefix,
        gateway: gateway(&network),
        class: classify(&address),
        is_private: is_private(&address),
    })
}

pub fn classify(address: &Address) -> AddressClass {
    match address {
        Address::V6(_) => AddressClass::IPv6,
        Address::V4(ip) => match ip.octets()[0] {
            1..=126 => AddressClass::A,
            128..=191 => AddressClass::B,
            192..=223 => AddressClass::C,
            224..=239 => AddressClass::D,
            240..=255 => AddressClass::E,
            _ => AddressClass::Unknown,
        },
    }
}

/// Mask width implied by the address's class.
///
/// Uses the leading bits, so `0.x.x.x` and `127.x.x.x` land in the /8 range
/// even though they classify as `Unknown`.
pub fn default_prefix(address: &Address) -> Prefix {
    match address {
        Address::V6(_) => Prefix::IPV6_DEFAULT,
        Address::V4(ip) => match ip.octets()[0] {
            0..=127 => Prefix::CLASS_A,
            128..=191 => Prefix::CLASS_B,
            192..=223 => Prefix::CLASS_C,
            _ => Prefix::HOST_V4,
        },
    }
}

/// Gateway of an IPv4 network: the network with its last byte not fully
/// covered by the mask incremented by one. A /32 has no such byte and is
/// returned unchanged.
pub fn gateway(network: &IpNetwork) -> Option<Address> {
    match network {
        IpNetwork::V4(net) => {
            let octets = increment_host_byte(net.network().octets(), net.mask().octets());
            Some(Address::V4(Ipv4Addr::from(octets)))
        }
        IpNetwork::V6(_) => None,
    }
}

// No carry into the next byte. A mask byte other than 0xFF has its low bit
// clear, so the byte under it is at most 254 and saturation never kicks in.
fn increment_host_byte<const N: usize>(mut network: [u8; N], mask: [u8; N]) -> [u8; N] {
    if let Some(i) = (0..N).rev().find(|&i| mask[i] != 0xFF) {
        network[i] = network[i].saturating_add(1);
    }
    network
}

/// RFC 1918, loopback and link-local for IPv4; unique-local, loopback and
/// link-local for IPv6.
pub fn is_private(address: &Address) -> bool {
    match address {
        Address::V4(ip) => is_private_v4(ip),
        Address::V6(ip) => is_private_v6(ip),
    }
}

fn is_private_v4(ip: &Ipv4Addr) -> bool {
    ip.is_private() || ip.is_loopback() || ip.is_link_local()
}

fn is_private_v6(ip: &Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    let unique_local = (first & 0xfe00) == 0xfc00; // fc00::/7
    let link_local = (first & 0xffc0) == 0xfe80; // fe80::/10

    unique_local || link_local || ip.is_loopback()
}
