//! Telemetry events published by agents.
//!
//! An `AgentEvent` is immutable once built: a source agent, an optional
//! target address, a timestamp, a set of tags, and a kind-specific payload.
//! Every payload reports a stable `AgentEventKind`, and every kind declares a
//! default set of tags, so subscribers can filter without inspecting types at
//! runtime.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::credentials::Credentials;
use crate::machine::OperatingSystem;

/// MITRE ATT&CK technique tags attached to events by default.
pub mod tags {
    pub const ACTIVE_SCANNING: &str = "attack-t1595";
    pub const NETWORK_SERVICE_DISCOVERY: &str = "attack-t1046";
    pub const OS_CREDENTIAL_DUMPING: &str = "attack-t1003";
    pub const EXPLOITATION_OF_REMOTE_SERVICES: &str = "attack-t1210";
    pub const LATERAL_TOOL_TRANSFER: &str = "attack-t1570";
    pub const SYSTEM_INFORMATION_DISCOVERY: &str = "attack-t1082";
    pub const DATA_ENCRYPTED_FOR_IMPACT: &str = "attack-t1486";
}

/// Stable identifier of an event kind, used as a subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentEventKind {
    PingScan,
    TcpScan,
    CredentialsStolen,
    Exploitation,
    Propagation,
    AgentShutdown,
    OsDiscovery,
    HostnameDiscovery,
    FileEncryption,
}

impl AgentEventKind {
    pub const ALL: [AgentEventKind; 9] = [
        AgentEventKind::PingScan,
        AgentEventKind::TcpScan,
        AgentEventKind::CredentialsStolen,
        AgentEventKind::Exploitation,
        AgentEventKind::Propagation,
        AgentEventKind::AgentShutdown,
        AgentEventKind::OsDiscovery,
        AgentEventKind::HostnameDiscovery,
        AgentEventKind::FileEncryption,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentEventKind::PingScan => "ping_scan",
            AgentEventKind::TcpScan => "tcp_scan",
            AgentEventKind::CredentialsStolen => "credentials_stolen",
            AgentEventKind::Exploitation => "exploitation",
            AgentEventKind::Propagation => "propagation",
            AgentEventKind::AgentShutdown => "agent_shutdown",
            AgentEventKind::OsDiscovery => "os_discovery",
            AgentEventKind::HostnameDiscovery => "hostname_discovery",
            AgentEventKind::FileEncryption => "file_encryption",
        }
    }

    /// Tags every event of this kind carries.
    pub fn default_tags(&self) -> &'static [&'static str] {
        match self {
            AgentEventKind::PingScan => &[tags::ACTIVE_SCANNING],
            AgentEventKind::TcpScan => &[tags::ACTIVE_SCANNING, tags::NETWORK_SERVICE_DISCOVERY],
            AgentEventKind::CredentialsStolen => &[tags::OS_CREDENTIAL_DUMPING],
            AgentEventKind::Exploitation => &[tags::EXPLOITATION_OF_REMOTE_SERVICES],
            AgentEventKind::Propagation => &[tags::LATERAL_TOOL_TRANSFER],
            AgentEventKind::AgentShutdown => &[],
            AgentEventKind::OsDiscovery | AgentEventKind::HostnameDiscovery => {
                &[tags::SYSTEM_INFORMATION_DISCOVERY]
            }
            AgentEventKind::FileEncryption => &[tags::DATA_ENCRYPTED_FOR_IMPACT],
        }
    }
}

impl fmt::Display for AgentEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a TCP port observed by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortStatus {
    Open,
    Closed,
}

/// Kind-specific event data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEventPayload {
    PingScan {
        response_received: bool,
        os: Option<OperatingSystem>,
    },
    TcpScan {
        #[serde(with = "port_map")]
        ports: BTreeMap<u16, PortStatus>,
    },
    CredentialsStolen {
        stolen_credentials: Vec<Credentials>,
    },
    Exploitation {
        exploiter_name: String,
        success: bool,
        #[serde(default)]
        error_message: String,
    },
    Propagation {
        exploiter_name: String,
        success: bool,
        #[serde(default)]
        error_message: String,
    },
    AgentShutdown,
    OsDiscovery {
        os: OperatingSystem,
        version: String,
    },
    HostnameDiscovery {
        name: String,
    },
    FileEncryption {
        file_path: String,
        success: bool,
        #[serde(default)]
        error_message: String,
    },
}

// The tagged payload is buffered before it is decoded, and buffered map keys
// only decode as strings.
mod port_map {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::PortStatus;

    pub fn serialize<S: Serializer>(
        ports: &BTreeMap<u16, PortStatus>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(ports.iter().map(|(port, status)| (port.to_string(), status)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<u16, PortStatus>, D::Error> {
        BTreeMap::<String, PortStatus>::deserialize(deserializer)?
            .into_iter()
            .map(|(port, status)| {
                port.parse::<u16>()
                    .map(|port| (port, status))
                    .map_err(|_| D::Error::custom(format!("invalid port '{port}'")))
            })
            .collect()
    }
}

impl AgentEventPayload {
    pub fn kind(&self) -> AgentEventKind {
        match self {
            AgentEventPayload::PingScan { .. } => AgentEventKind::PingScan,
            AgentEventPayload::TcpScan { .. } => AgentEventKind::TcpScan,
            AgentEventPayload::CredentialsStolen { .. } => AgentEventKind::CredentialsStolen,
            AgentEventPayload::Exploitation { .. } => AgentEventKind::Exploitation,
            AgentEventPayload::Propagation { .. } => AgentEventKind::Propagation,
            AgentEventPayload::AgentShutdown => AgentEventKind::AgentShutdown,
            AgentEventPayload::OsDiscovery { .. } => AgentEventKind::OsDiscovery,
            AgentEventPayload::HostnameDiscovery { .. } => AgentEventKind::HostnameDiscovery,
            AgentEventPayload::FileEncryption { .. } => AgentEventKind::FileEncryption,
        }
    }
}

/// A telemetry event observed by an agent.
///
/// Decoding always adds the kind's default tags, whether or not the
/// producer listed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAgentEvent")]
pub struct AgentEvent {
    source: AgentId,
    target: Option<Ipv4Addr>,
    timestamp: DateTime<Utc>,
    tags: BTreeSet<String>,
    payload: AgentEventPayload,
}

#[derive(Deserialize)]
struct RawAgentEvent {
    source: AgentId,
    #[serde(default)]
    target: Option<Ipv4Addr>,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    tags: BTreeSet<String>,
    payload: AgentEventPayload,
}

impl From<RawAgentEvent> for AgentEvent {
    fn from(raw: RawAgentEvent) -> Self {
        let mut tags = default_tags(&raw.payload);
        tags.extend(raw.tags);
        Self {
            source: raw.source,
            target: raw.target,
            timestamp: raw.timestamp,
            tags,
            payload: raw.payload,
        }
    }
}

fn default_tags(payload: &AgentEventPayload) -> BTreeSet<String> {
    payload
        .kind()
        .default_tags()
        .iter()
        .map(|tag| (*tag).to_string())
        .collect()
}

impl AgentEvent {
    /// Build an event stamped with the current time and its kind's default tags.
    pub fn new(source: AgentId, payload: AgentEventPayload) -> Self {
        let tags = default_tags(&payload);
        Self {
            source,
            target: None,
            timestamp: Utc::now(),
            tags,
            payload,
        }
    }

    pub fn with_target(mut self, target: Ipv4Addr) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn source(&self) -> AgentId {
        self.source
    }

    pub fn target(&self) -> Option<Ipv4Addr> {
        self.target
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn payload(&self) -> &AgentEventPayload {
        &self.payload
    }

    pub fn kind(&self) -> AgentEventKind {
        self.payload.kind()
    }
}
