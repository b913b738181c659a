//! Machine records: the hosts that make up the simulated network topology.

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::network::NetworkInterface;

/// Identifier of a machine record, allocated by the machine repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineId(pub u32);

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable hardware fingerprint reported by an agent (typically the MAC-derived
/// node id). Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct HardwareId(u64);

impl HardwareId {
    /// Returns `None` for zero, which is not a valid fingerprint.
    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for HardwareId {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "hardware id must be a positive integer".to_string())
    }
}

impl From<HardwareId> for u64 {
    fn from(value: HardwareId) -> Self {
        value.0
    }
}

impl fmt::Display for HardwareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operating system family of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingSystem {
    Linux,
    Windows,
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingSystem::Linux => write!(f, "linux"),
            OperatingSystem::Windows => write!(f, "windows"),
        }
    }
}

/// A physical or virtual host.
///
/// `id` and `island` are fixed at construction. Network interfaces are kept
/// in insertion order and deduplicated by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Machine {
    id: MachineId,
    #[serde(default)]
    pub hardware_id: Option<HardwareId>,
    #[serde(default)]
    island: bool,
    #[serde(default)]
    network_interfaces: Vec<NetworkInterface>,
    #[serde(default)]
    pub operating_system: Option<OperatingSystem>,
    #[serde(default)]
    pub operating_system_version: String,
    #[serde(default)]
    pub hostname: String,
}

impl Machine {
    pub fn new(id: MachineId) -> Self {
        Self {
            id,
            hardware_id: None,
            island: false,
            network_interfaces: Vec::new(),
            operating_system: None,
            operating_system_version: String::new(),
            hostname: String::new(),
        }
    }

    /// Build the record for the machine hosting the Island itself.
    pub fn island(id: MachineId) -> Self {
        Self {
            island: true,
            ..Self::new(id)
        }
    }

    pub fn with_hardware_id(mut self, hardware_id: HardwareId) -> Self {
        self.hardware_id = Some(hardware_id);
        self
    }

    pub fn with_network_interfaces(
        mut self,
        interfaces: impl IntoIterator<Item = NetworkInterface>,
    ) -> Self {
        self.set_network_interfaces(interfaces);
        self
    }

    pub fn id(&self) -> MachineId {
        self.id
    }

    pub fn is_island(&self) -> bool {
        self.island
    }

    pub fn network_interfaces(&self) -> &[NetworkInterface] {
        &self.network_interfaces
    }

    /// Replace the interface list, dropping repeated values but keeping the
    /// order of first appearance.
    pub fn set_network_interfaces(
        &mut self,
        interfaces: impl IntoIterator<Item = NetworkInterface>,
    ) {
        let mut deduped: Vec<NetworkInterface> = Vec::new();
        for iface in interfaces {
            if !deduped.contains(&iface) {
                deduped.push(iface);
            }
        }
        self.network_interfaces = deduped;
    }

    /// Whether any of this machine's interfaces carries `ip`.
    pub fn has_ip(&self, ip: Ipv4Addr) -> bool {
        self.network_interfaces.iter().any(|iface| iface.ip() == ip)
    }
}
