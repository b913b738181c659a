//! Applies the agent configuration profile of an Island mode.

use std::sync::Arc;

use island_types::error::RepositoryError;
use island_types::island_event::IslandMode;
use tracing::info;

use crate::repository::AgentConfigurationRepository;

pub struct SetAgentConfigurationPerIslandMode {
    agent_configuration_repository: Arc<dyn AgentConfigurationRepository>,
}

impl SetAgentConfigurationPerIslandMode {
    pub fn new(agent_configuration_repository: Arc<dyn AgentConfigurationRepository>) -> Self {
        Self {
            agent_configuration_repository,
        }
    }

    /// Ransomware mode starts from the default configuration with the
    /// ransomware payload enabled; every other mode uses the default.
    pub fn apply(&self, mode: IslandMode) -> Result<(), RepositoryError> {
        self.agent_configuration_repository.reset_to_default()?;
        if mode == IslandMode::Ransomware {
            let mut configuration = self.agent_configuration_repository.get_configuration()?;
            configuration.ransomware_enabled = true;
            self.agent_configuration_repository
                .store_configuration(&configuration)?;
        }
        info!(mode = %mode, "agent configuration set for island mode");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeAgentConfigurationRepository;

    #[test]
    fn test_ransomware_mode_enables_ransomware() {
        let repository = Arc::new(FakeAgentConfigurationRepository::default());
        SetAgentConfigurationPerIslandMode::new(repository.clone())
            .apply(IslandMode::Ransomware)
            .unwrap();
        assert!(repository.get_configuration().unwrap().ransomware_enabled);
    }

    #[test]
    fn test_advanced_mode_restores_default() {
        let repository = Arc::new(FakeAgentConfigurationRepository::default());
        repository.configuration.lock().ransomware_enabled = true;

        SetAgentConfigurationPerIslandMode::new(repository.clone())
            .apply(IslandMode::Advanced)
            .unwrap();

        assert!(!repository.get_configuration().unwrap().ransomware_enabled);
    }
}
