use std::collections::{BTreeMap, BTreeSet};

use dashmap::DashMap;
use island_core::repository::NodeRepository;
use island_types::error::RepositoryError;
use island_types::machine::MachineId;
use island_types::node::{CommunicationType, Node};

#[derive(Debug, Default)]
pub struct InMemoryNodeRepository {
    nodes: DashMap<MachineId, Node>,
}

impl InMemoryNodeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeRepository for InMemoryNodeRepository {
    fn upsert_communication(
        &self,
        source: MachineId,
        destination: MachineId,
        communication: CommunicationType,
    ) -> Result<(), RepositoryError> {
        self.nodes
            .entry(source)
            .or_insert_with(|| Node::new(source))
            .connections
            .entry(destination)
            .or_default()
            .insert(communication);
        Ok(())
    }

    fn upsert_tcp_connections(
        &self,
        source: MachineId,
        connections: &BTreeMap<MachineId, BTreeSet<u16>>,
    ) -> Result<(), RepositoryError> {
        let mut node = self.nodes.entry(source).or_insert_with(|| Node::new(source));
        for (destination, ports) in connections {
            node.tcp_connections
                .entry(*destination)
                .or_default()
                .extend(ports.iter().copied());
        }
        Ok(())
    }

    fn get_nodes(&self) -> Result<Vec<Node>, RepositoryError> {
        let mut nodes: Vec<Node> = self.nodes.iter().map(|entry| entry.value().clone()).collect();
        nodes.sort_by_key(|node| node.machine_id);
        Ok(nodes)
    }

    fn reset(&self) -> Result<(), RepositoryError> {
        self.nodes.clear();
        Ok(())
    }
}
