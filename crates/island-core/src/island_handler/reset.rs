//! Handlers that return repositories to their initial state.

use std::sync::Arc;

use island_types::config::IslandMachineConfig;
use island_types::error::RepositoryError;
use island_types::machine::Machine;
use tracing::info;

use crate::repository::{AgentConfigurationRepository, MachineRepository};

pub fn reset_agent_configuration(
    repository: &dyn AgentConfigurationRepository,
) -> Result<(), RepositoryError> {
    repository.reset_to_default()?;
    info!("agent configuration reset to default");
    Ok(())
}

/// Empties the machine repository, then puts the Island's own machine back.
pub struct ResetMachineRepository {
    machine_repository: Arc<dyn MachineRepository>,
    island_machine: IslandMachineConfig,
}

impl ResetMachineRepository {
    pub fn new(
        machine_repository: Arc<dyn MachineRepository>,
        island_machine: IslandMachineConfig,
    ) -> Self {
        Self {
            machine_repository,
            island_machine,
        }
    }

    pub fn reset(&self) -> Result<(), RepositoryError> {
        self.machine_repository.reset()?;
        self.add_island_machine()
    }

    /// Insert the machine the Island runs on, marked as the Island.
    pub fn add_island_machine(&self) -> Result<(), RepositoryError> {
        let mut machine = Machine::island(self.machine_repository.get_new_id()?)
            .with_network_interfaces(self.island_machine.network_interfaces.iter().copied());
        machine.hardware_id = self.island_machine.hardware_id;
        machine.hostname = self.island_machine.hostname.clone();

        self.machine_repository.upsert_machine(&machine)?;
        info!(machine_id = %machine.id(), "island machine added");
        Ok(())
    }
}
