//! In-memory agent repository.

use std::collections::HashSet;

use island_core::repository::AgentRepository;
use island_types::agent::{Agent, AgentId};
use island_types::error::RepositoryError;
use parking_lot::RwLock;

/// Agent records in insertion order. Registration appends, so one agent id
/// may own several records; lookups by id see the newest.
#[derive(Debug, Default)]
pub struct InMemoryAgentRepository {
    records: RwLock<Vec<Agent>>,
}

impl InMemoryAgentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AgentRepository for InMemoryAgentRepository {
    fn insert_agent(&self, agent: &Agent) -> Result<(), RepositoryError> {
        self.records.write().push(agent.clone());
        Ok(())
    }

    fn upsert_agent(&self, agent: &Agent) -> Result<(), RepositoryError> {
        let mut records = self.records.write();
        match records.iter_mut().rev().find(|record| record.id == agent.id) {
            Some(record) => *record = agent.clone(),
            None => records.push(agent.clone()),
        }
        Ok(())
    }

    fn get_agent_by_id(&self, id: AgentId) -> Result<Agent, RepositoryError> {
        self.records
            .read()
            .iter()
            .rev()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::UnknownRecord(format!("agent {id}")))
    }

    fn get_agents(&self) -> Result<Vec<Agent>, RepositoryError> {
        Ok(self.records.read().clone())
    }

    /// Agents whose newest record has no stop time, oldest first.
    fn get_running_agents(&self) -> Result<Vec<Agent>, RepositoryError> {
        let records = self.records.read();
        let mut seen = HashSet::new();
        let mut running: Vec<Agent> = records
            .iter()
            .rev()
            .filter(|record| seen.insert(record.id))
            .filter(|record| record.is_running())
            .cloned()
            .collect();
        running.reverse();
        Ok(running)
    }

    fn reset(&self) -> Result<(), RepositoryError> {
        self.records.write().clear();
        Ok(())
    }
}
