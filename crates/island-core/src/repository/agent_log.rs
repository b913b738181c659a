//! Agent log repository trait definition.

use island_types::agent::AgentId;
use island_types::error::RepositoryError;

/// Stores the log text each agent uploads when it finishes.
pub trait AgentLogRepository: Send + Sync {
    fn upsert_agent_log(&self, agent_id: AgentId, log: &str) -> Result<(), RepositoryError>;

    fn get_agent_log(&self, agent_id: AgentId) -> Result<String, RepositoryError>;

    fn reset(&self) -> Result<(), RepositoryError>;
}
