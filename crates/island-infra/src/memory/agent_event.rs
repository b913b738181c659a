//! In-memory agent event repository.

use island_core::repository::AgentEventRepository;
use island_types::agent::AgentId;
use island_types::error::RepositoryError;
use island_types::event::{AgentEvent, AgentEventKind};
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryAgentEventRepository {
    events: RwLock<Vec<AgentEvent>>,
}

impl InMemoryAgentEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered(&self, predicate: impl Fn(&AgentEvent) -> bool) -> Vec<AgentEvent> {
        self.events
            .read()
            .iter()
            .filter(|event| predicate(event))
            .cloned()
            .collect()
    }
}

impl AgentEventRepository for InMemoryAgentEventRepository {
    fn save_event(&self, event: &AgentEvent) -> Result<(), RepositoryError> {
        self.events.write().push(event.clone());
        Ok(())
    }

    fn get_events(&self) -> Result<Vec<AgentEvent>, RepositoryError> {
        Ok(self.events.read().clone())
    }

    fn get_events_by_type(&self, kind: AgentEventKind) -> Result<Vec<AgentEvent>, RepositoryError> {
        Ok(self.filtered(|event| event.kind() == kind))
    }

    fn get_events_by_tag(&self, tag: &str) -> Result<Vec<AgentEvent>, RepositoryError> {
        Ok(self.filtered(|event| event.has_tag(tag)))
    }

    fn get_events_by_source(&self, source: AgentId) -> Result<Vec<AgentEvent>, RepositoryError> {
        Ok(self.filtered(|event| event.source() == source))
    }

    fn reset(&self) -> Result<(), RepositoryError> {
        self.events.write().clear();
        Ok(())
    }
}
