//! Lifecycle signals published inside the Island process.
//!
//! Topics form a closed set. Each `IslandEvent` variant belongs to exactly
//! one topic and carries that topic's payload, if any.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::{AgentId, AgentRegistrationData};

/// Coarse-grained lifecycle topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IslandEventTopic {
    AgentHeartbeat,
    AgentRegistered,
    ResetAgentConfiguration,
    ClearSimulationData,
    SetIslandMode,
    TerminateAgents,
}

impl IslandEventTopic {
    pub const ALL: [IslandEventTopic; 6] = [
        IslandEventTopic::AgentHeartbeat,
        IslandEventTopic::AgentRegistered,
        IslandEventTopic::ResetAgentConfiguration,
        IslandEventTopic::ClearSimulationData,
        IslandEventTopic::SetIslandMode,
        IslandEventTopic::TerminateAgents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IslandEventTopic::AgentHeartbeat => "AGENT_HEARTBEAT",
            IslandEventTopic::AgentRegistered => "AGENT_REGISTERED",
            IslandEventTopic::ResetAgentConfiguration => "RESET_AGENT_CONFIGURATION",
            IslandEventTopic::ClearSimulationData => "CLEAR_SIMULATION_DATA",
            IslandEventTopic::SetIslandMode => "SET_ISLAND_MODE",
            IslandEventTopic::TerminateAgents => "TERMINATE_AGENTS",
        }
    }
}

impl fmt::Display for IslandEventTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating mode selected by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IslandMode {
    #[default]
    Unset,
    Ransomware,
    Advanced,
}

impl fmt::Display for IslandMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IslandMode::Unset => write!(f, "unset"),
            IslandMode::Ransomware => write!(f, "ransomware"),
            IslandMode::Advanced => write!(f, "advanced"),
        }
    }
}

/// A published Island lifecycle signal with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IslandEvent {
    AgentHeartbeat {
        agent_id: AgentId,
        timestamp: DateTime<Utc>,
    },
    AgentRegistered {
        registration: AgentRegistrationData,
    },
    ResetAgentConfiguration,
    ClearSimulationData,
    SetIslandMode {
        mode: IslandMode,
    },
    TerminateAgents {
        timestamp: DateTime<Utc>,
    },
}

impl IslandEvent {
    pub fn topic(&self) -> IslandEventTopic {
        match self {
            IslandEvent::AgentHeartbeat { .. } => IslandEventTopic::AgentHeartbeat,
            IslandEvent::AgentRegistered { .. } => IslandEventTopic::AgentRegistered,
            IslandEvent::ResetAgentConfiguration => IslandEventTopic::ResetAgentConfiguration,
            IslandEvent::ClearSimulationData => IslandEventTopic::ClearSimulationData,
            IslandEvent::SetIslandMode { .. } => IslandEventTopic::SetIslandMode,
            IslandEvent::TerminateAgents { .. } => IslandEventTopic::TerminateAgents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_names_match_serde() {
        for topic in IslandEventTopic::ALL {
            let json = serde_json::to_string(&topic).unwrap();
            assert_eq!(json, format!("\"{}\"", topic.as_str()));
        }
    }

    #[test]
    fn test_event_reports_its_topic() {
        let event = IslandEvent::SetIslandMode {
            mode: IslandMode::Ransomware,
        };
        assert_eq!(event.topic(), IslandEventTopic::SetIslandMode);
        assert_eq!(
            IslandEvent::ClearSimulationData.topic(),
            IslandEventTopic::ClearSimulationData
        );
    }

    #[test]
    fn test_event_json_is_tagged_by_topic() {
        let json = serde_json::to_value(IslandEvent::SetIslandMode {
            mode: IslandMode::Advanced,
        })
        .unwrap();
        assert_eq!(json["topic"], "SET_ISLAND_MODE");
        assert_eq!(json["mode"], "advanced");

        let parsed: IslandEvent = serde_json::from_str(
            r#"{"topic": "TERMINATE_AGENTS", "timestamp": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(parsed.topic(), IslandEventTopic::TerminateAgents);
    }

    #[test]
    fn test_island_mode_defaults_to_unset() {
        assert_eq!(IslandMode::default(), IslandMode::Unset);
    }
}
