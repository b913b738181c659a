use thiserror::Error;

use crate::agent::AgentId;
use crate::event::AgentEventKind;
use crate::island_event::IslandEventTopic;
use crate::machine::{HardwareId, MachineId};

/// Errors from repository operations (used by trait definitions in island-core).
///
/// `UnknownRecord` is the expected outcome of a lookup that finds nothing and
/// is distinct from `Retrieval`, which means the read itself failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("retrieval error: {0}")]
    Retrieval(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("removal error: {0}")]
    Removal(String),

    #[error("unknown record: {0}")]
    UnknownRecord(String),
}

impl RepositoryError {
    pub fn is_unknown_record(&self) -> bool {
        matches!(self, RepositoryError::UnknownRecord(_))
    }
}

/// Errors raised while reconciling an agent registration with stored machines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconciliationError {
    #[error(
        "hardware id mismatch for agent {agent_id}: machine {machine_id} has hardware id {existing}, registration reports {incoming}"
    )]
    HardwareIdMismatch {
        agent_id: AgentId,
        machine_id: MachineId,
        existing: HardwareId,
        incoming: HardwareId,
    },
}

/// Error returned by an event subscriber or topic handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    #[error("handler for {expected} received a {actual} event")]
    UnexpectedEvent {
        expected: AgentEventKind,
        actual: AgentEventKind,
    },

    #[error("handler for {expected} received a {actual} signal")]
    UnexpectedTopic {
        expected: IslandEventTopic,
        actual: IslandEventTopic,
    },

    #[error("event is missing required field '{0}'")]
    MissingField(&'static str),
}
