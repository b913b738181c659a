//! Agent records and the data an agent reports when it registers.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::machine::{HardwareId, MachineId};
use crate::network::NetworkInterface;

/// Identifier an agent assigns to itself before registering with the Island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AgentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One running instance of the propagating agent.
///
/// Agents form a propagation tree through `parent_id`. `stop_time` is set
/// once, either from a shutdown event or inferred from missing heartbeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub machine_id: MachineId,
    pub start_time: DateTime<Utc>,
    pub parent_id: Option<AgentId>,
    pub cc_server: SocketAddr,
    #[serde(default)]
    pub stop_time: Option<DateTime<Utc>>,
}

impl Agent {
    pub fn is_running(&self) -> bool {
        self.stop_time.is_none()
    }
}

/// Announcement an agent sends to the Island when it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRegistrationData {
    pub id: AgentId,
    pub machine_hardware_id: HardwareId,
    pub start_time: DateTime<Utc>,
    pub parent_id: Option<AgentId>,
    pub cc_server: SocketAddr,
    pub network_interfaces: Vec<NetworkInterface>,
}

/// Control signals returned to an agent when it polls the Island.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSignals {
    /// Time at which the operator asked agents to stop, if it applies to
    /// this agent.
    pub terminate: Option<DateTime<Utc>>,
}
