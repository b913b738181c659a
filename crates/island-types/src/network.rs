//! IPv4 network interface value type.
//!
//! A `NetworkInterface` is an address plus its prefix length, written in CIDR
//! notation (`192.168.1.2/24`). It serializes as that string.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing a `NetworkInterface` from a string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InterfaceParseError {
    #[error("invalid IPv4 address '{0}'")]
    Address(String),

    #[error("invalid prefix length '{0}' (expected 0-32)")]
    Prefix(String),
}

/// An IPv4 address bound to a network of a given prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NetworkInterface {
    ip: Ipv4Addr,
    prefix_len: u8,
}

impl NetworkInterface {
    /// Build an interface, rejecting prefix lengths above 32.
    pub fn new(ip: Ipv4Addr, prefix_len: u8) -> Result<Self, InterfaceParseError> {
        if prefix_len > 32 {
            return Err(InterfaceParseError::Prefix(prefix_len.to_string()));
        }
        Ok(Self { ip, prefix_len })
    }

    /// A host interface (`/32`).
    pub fn host(ip: Ipv4Addr) -> Self {
        Self { ip, prefix_len: 32 }
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Network address of this interface (host bits cleared).
    pub fn network(&self) -> Ipv4Addr {
        let mask = if self.prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(self.prefix_len))
        };
        Ipv4Addr::from(u32::from(self.ip) & mask)
    }

    /// Whether `addr` falls inside this interface's network.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let other = Self {
            ip: addr,
            prefix_len: self.prefix_len,
        };
        other.network() == self.network()
    }
}

impl fmt::Display for NetworkInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix_len)
    }
}

impl FromStr for NetworkInterface {
    type Err = InterfaceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, prefix) = match s.trim().split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (s.trim(), None),
        };

        let ip = addr
            .parse::<Ipv4Addr>()
            .map_err(|_| InterfaceParseError::Address(addr.to_string()))?;

        match prefix {
            None => Ok(Self::host(ip)),
            Some(prefix) => {
                let prefix_len = prefix
                    .parse::<u8>()
                    .map_err(|_| InterfaceParseError::Prefix(prefix.to_string()))?;
                Self::new(ip, prefix_len)
            }
        }
    }
}

impl TryFrom<String> for NetworkInterface {
    type Error = InterfaceParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NetworkInterface> for String {
    fn from(value: NetworkInterface) -> Self {
        value.to_string()
    }
}
