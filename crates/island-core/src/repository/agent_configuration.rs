//! Agent configuration repository trait definition.

use island_types::agent_configuration::AgentConfiguration;
use island_types::error::RepositoryError;

/// Holds the configuration handed to agents when they start.
pub trait AgentConfigurationRepository: Send + Sync {
    fn get_configuration(&self) -> Result<AgentConfiguration, RepositoryError>;

    fn store_configuration(&self, configuration: &AgentConfiguration)
    -> Result<(), RepositoryError>;

    fn reset_to_default(&self) -> Result<(), RepositoryError>;
}
