use island_core::repository::AgentConfigurationRepository;
use island_types::agent_configuration::AgentConfiguration;
use island_types::error::RepositoryError;
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryAgentConfigurationRepository {
    configuration: RwLock<AgentConfiguration>,
}

impl InMemoryAgentConfigurationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AgentConfigurationRepository for InMemoryAgentConfigurationRepository {
    fn get_configuration(&self) -> Result<AgentConfiguration, RepositoryError> {
        Ok(self.configuration.read().clone())
    }

    fn store_configuration(
        &self,
        configuration: &AgentConfiguration,
    ) -> Result<(), RepositoryError> {
        *self.configuration.write() = configuration.clone();
        Ok(())
    }

    fn reset_to_default(&self) -> Result<(), RepositoryError> {
        *self.configuration.write() = AgentConfiguration::default();
        Ok(())
    }
}
