//! Lookup of the machine an agent runs on.

use std::sync::Arc;

use dashmap::DashMap;
use island_types::agent::AgentId;
use island_types::error::RepositoryError;
use island_types::machine::{Machine, MachineId};

use crate::repository::{AgentRepository, MachineRepository};

/// Resolves agents to their machines, caching the agent-to-machine mapping.
///
/// A re-registering agent may land on another machine, so its entry is
/// dropped on every registration; the whole cache is dropped when the
/// repositories are emptied.
pub struct AgentMachineFacade {
    agent_repository: Arc<dyn AgentRepository>,
    machine_repository: Arc<dyn MachineRepository>,
    machine_ids: DashMap<AgentId, MachineId>,
}

impl AgentMachineFacade {
    pub fn new(
        agent_repository: Arc<dyn AgentRepository>,
        machine_repository: Arc<dyn MachineRepository>,
    ) -> Self {
        Self {
            agent_repository,
            machine_repository,
            machine_ids: DashMap::new(),
        }
    }

    pub fn get_machine_id_from_agent_id(
        &self,
        agent_id: AgentId,
    ) -> Result<MachineId, RepositoryError> {
        if let Some(machine_id) = self.machine_ids.get(&agent_id) {
            return Ok(*machine_id);
        }
        let machine_id = self.agent_repository.get_agent_by_id(agent_id)?.machine_id;
        self.machine_ids.insert(agent_id, machine_id);
        Ok(machine_id)
    }

    pub fn get_agent_machine(&self, agent_id: AgentId) -> Result<Machine, RepositoryError> {
        let machine_id = self.get_machine_id_from_agent_id(agent_id)?;
        self.machine_repository.get_machine_by_id(machine_id)
    }

    pub fn upsert_machine(&self, machine: &Machine) -> Result<(), RepositoryError> {
        self.machine_repository.upsert_machine(machine)
    }

    /// Drop the cached machine of one agent.
    pub fn forget_agent(&self, agent_id: AgentId) {
        self.machine_ids.remove(&agent_id);
    }

    pub fn reset_cache(&self) {
        self.machine_ids.clear();
    }
}

impl std::fmt::Debug for AgentMachineFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentMachineFacade")
            .field("cached", &self.machine_ids.len())
            .finish()
    }
}
