use dashmap::DashMap;
use island_core::repository::AgentLogRepository;
use island_types::agent::AgentId;
use island_types::error::RepositoryError;

#[derive(Debug, Default)]
pub struct InMemoryAgentLogRepository {
    logs: DashMap<AgentId, String>,
}

impl InMemoryAgentLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AgentLogRepository for InMemoryAgentLogRepository {
    fn upsert_agent_log(&self, agent_id: AgentId, log: &str) -> Result<(), RepositoryError> {
        self.logs.insert(agent_id, log.to_string());
        Ok(())
    }

    fn get_agent_log(&self, agent_id: AgentId) -> Result<String, RepositoryError> {
        self.logs
            .get(&agent_id)
            .map(|log| log.clone())
            .ok_or_else(|| RepositoryError::UnknownRecord(format!("log of agent {agent_id}")))
    }

    fn reset(&self) -> Result<(), RepositoryError> {
        self.logs.clear();
        Ok(())
    }
}
