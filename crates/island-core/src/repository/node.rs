//! Node repository trait definition.

use std::collections::{BTreeMap, BTreeSet};

use island_types::error::RepositoryError;
use island_types::machine::MachineId;
use island_types::node::{CommunicationType, Node};

/// Repository for the network map: which machine talked to which, and how.
pub trait NodeRepository: Send + Sync {
    /// Record that `source` communicated with `destination`. Creates the
    /// source node if needed.
    fn upsert_communication(
        &self,
        source: MachineId,
        destination: MachineId,
        communication: CommunicationType,
    ) -> Result<(), RepositoryError>;

    /// Merge open TCP ports, keyed by destination machine, into the node of
    /// `source`.
    fn upsert_tcp_connections(
        &self,
        source: MachineId,
        connections: &BTreeMap<MachineId, BTreeSet<u16>>,
    ) -> Result<(), RepositoryError>;

    fn get_nodes(&self) -> Result<Vec<Node>, RepositoryError>;

    fn reset(&self) -> Result<(), RepositoryError>;
}
