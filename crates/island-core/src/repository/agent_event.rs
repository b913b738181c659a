//! Agent event repository trait definition.

use island_types::agent::AgentId;
use island_types::error::RepositoryError;
use island_types::event::{AgentEvent, AgentEventKind};

/// Append-only store of every event agents have published.
pub trait AgentEventRepository: Send + Sync {
    fn save_event(&self, event: &AgentEvent) -> Result<(), RepositoryError>;

    fn get_events(&self) -> Result<Vec<AgentEvent>, RepositoryError>;

    fn get_events_by_type(&self, kind: AgentEventKind) -> Result<Vec<AgentEvent>, RepositoryError>;

    fn get_events_by_tag(&self, tag: &str) -> Result<Vec<AgentEvent>, RepositoryError>;

    fn get_events_by_source(&self, source: AgentId) -> Result<Vec<AgentEvent>, RepositoryError>;

    fn reset(&self) -> Result<(), RepositoryError>;
}
