//! Agent repository trait definition.

use island_types::agent::{Agent, AgentId};
use island_types::error::RepositoryError;

/// Repository trait for agent records.
///
/// Registration appends (`insert_agent`): an agent id that registers twice
/// has two records. Single-record lookups and `upsert_agent` address the
/// most recently inserted record for an id.
pub trait AgentRepository: Send + Sync {
    /// Append a new record, even if one with the same id exists.
    fn insert_agent(&self, agent: &Agent) -> Result<(), RepositoryError>;

    /// Replace the latest record with the agent's id, or append if none.
    fn upsert_agent(&self, agent: &Agent) -> Result<(), RepositoryError>;

    fn get_agent_by_id(&self, id: AgentId) -> Result<Agent, RepositoryError>;

    /// Every stored record, in insertion order.
    fn get_agents(&self) -> Result<Vec<Agent>, RepositoryError>;

    /// Records without a stop time.
    fn get_running_agents(&self) -> Result<Vec<Agent>, RepositoryError>;

    fn reset(&self) -> Result<(), RepositoryError>;
}
