//! Network topology model: which machines talked to which, and how.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::machine::MachineId;

/// How one machine reached another during a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationType {
    Scanned,
    Exploited,
    CC,
    Relay,
}

/// A machine as seen from the topology: its outgoing connections and the
/// TCP ports found open on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub machine_id: MachineId,
    #[serde(default)]
    pub connections: BTreeMap<MachineId, BTreeSet<CommunicationType>>,
    #[serde(default)]
    pub tcp_connections: BTreeMap<MachineId, BTreeSet<u16>>,
}

impl Node {
    pub fn new(machine_id: MachineId) -> Self {
        Self {
            machine_id,
            connections: BTreeMap::new(),
            tcp_connections: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_has_no_connections() {
        let node = Node::new(MachineId(7));
        assert!(node.connections.is_empty());
        assert!(node.tcp_connections.is_empty());
    }

    #[test]
    fn test_communication_type_names() {
        assert_eq!(
            serde_json::to_string(&CommunicationType::Exploited).unwrap(),
            "\"exploited\""
        );
        assert_eq!(serde_json::to_string(&CommunicationType::CC).unwrap(), "\"cc\"");
    }
}
