//! Application state wiring all services together.
//!
//! This is the only place concrete repository types are named. Everything
//! downstream sees the `island-core` traits.

use std::path::PathBuf;
use std::sync::Arc;

use island_core::event::{InMemoryAgentEventQueue, LockingAgentEventQueue};
use island_core::facade::AgentMachineFacade;
use island_core::island_event::{InMemoryIslandEventQueue, IslandEventQueue};
use island_core::island_handler::{AgentHeartbeatHandler, ResetMachineRepository};
use island_core::periodic::PeriodicCaller;
use island_core::service::AgentSignalsService;
use island_core::setup::{
    Repositories, heartbeat_caller, setup_agent_event_handlers, setup_island_event_handlers,
};
use island_infra::config::load_island_config;
use island_infra::memory::{
    InMemoryAgentConfigurationRepository, InMemoryAgentEventRepository, InMemoryAgentLogRepository,
    InMemoryAgentRepository, InMemoryCredentialsRepository, InMemoryMachineRepository,
    InMemoryNodeRepository, InMemorySimulationRepository,
};
use island_types::config::IslandConfig;
use island_types::island_event::{IslandEvent, IslandMode};

pub type AgentEventBus = LockingAgentEventQueue<InMemoryAgentEventQueue>;

/// Shared application state holding the buses and repositories.
pub struct AppState {
    pub config: IslandConfig,
    pub data_dir: PathBuf,
    pub repositories: Repositories,
    pub agent_event_queue: Arc<AgentEventBus>,
    pub island_event_queue: Arc<InMemoryIslandEventQueue>,
    pub agent_signals: Arc<AgentSignalsService>,
    pub heartbeat_handler: Arc<AgentHeartbeatHandler>,
}

impl AppState {
    /// Load configuration, build repositories, subscribe every handler and
    /// seed the machine repository with the Island's own machine.
    pub fn init(data_dir: PathBuf) -> anyhow::Result<Self> {
        let config = load_island_config(&data_dir);

        let repositories = Repositories {
            machines: Arc::new(InMemoryMachineRepository::new()),
            agents: Arc::new(InMemoryAgentRepository::new()),
            agent_events: Arc::new(InMemoryAgentEventRepository::new()),
            agent_logs: Arc::new(InMemoryAgentLogRepository::new()),
            credentials: Arc::new(InMemoryCredentialsRepository::new()),
            nodes: Arc::new(InMemoryNodeRepository::new()),
            agent_configuration: Arc::new(InMemoryAgentConfigurationRepository::new()),
            simulation: Arc::new(InMemorySimulationRepository::new()),
        };

        let agent_machine_facade = Arc::new(AgentMachineFacade::new(
            Arc::clone(&repositories.agents),
            Arc::clone(&repositories.machines),
        ));
        let heartbeat_handler = Arc::new(AgentHeartbeatHandler::new(
            Arc::clone(&repositories.agents),
            config.heartbeat_timeout(),
        ));
        let agent_signals = Arc::new(AgentSignalsService::new(
            Arc::clone(&repositories.simulation),
            Arc::clone(&repositories.agents),
        ));

        let mut agent_event_queue = LockingAgentEventQueue::new(InMemoryAgentEventQueue::new());
        setup_agent_event_handlers(&mut agent_event_queue, &repositories, &agent_machine_facade);

        let mut island_event_queue = InMemoryIslandEventQueue::new();
        setup_island_event_handlers(
            &mut island_event_queue,
            &repositories,
            &agent_machine_facade,
            &heartbeat_handler,
            &agent_signals,
            config.island_machine.clone(),
        );

        ResetMachineRepository::new(
            Arc::clone(&repositories.machines),
            config.island_machine.clone(),
        )
        .add_island_machine()?;

        if config.island_mode != IslandMode::Unset {
            island_event_queue.publish(IslandEvent::SetIslandMode {
                mode: config.island_mode,
            })?;
        }

        tracing::info!(data_dir = %data_dir.display(), "island state initialized");

        Ok(Self {
            config,
            data_dir,
            repositories,
            agent_event_queue: Arc::new(agent_event_queue),
            island_event_queue: Arc::new(island_event_queue),
            agent_signals,
            heartbeat_handler,
        })
    }

    /// Periodic caller for heartbeat stop-time inference; not yet started.
    pub fn heartbeat_caller(&self) -> PeriodicCaller {
        heartbeat_caller(
            Arc::clone(&self.heartbeat_handler),
            self.config.heartbeat_check_interval(),
        )
    }
}

#[cfg(test)]
mod tests {
    use island_core::repository::{
        AgentConfigurationRepository, MachineRepository, SimulationRepository,
    };
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_init_seeds_island_machine() {
        let tmp = TempDir::new().unwrap();
        let state = AppState::init(tmp.path().to_path_buf()).unwrap();

        let machines = state.repositories.machines.get_machines().unwrap();
        assert_eq!(machines.len(), 1);
        assert!(machines[0].is_island());
    }

    #[test]
    fn test_configured_mode_is_applied_at_startup() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("config.toml"), "island_mode = \"ransomware\"\n").unwrap();

        let state = AppState::init(tmp.path().to_path_buf()).unwrap();

        assert_eq!(state.repositories.simulation.get_mode().unwrap(), IslandMode::Ransomware);
        assert!(
            state
                .repositories
                .agent_configuration
                .get_configuration()
                .unwrap()
                .ransomware_enabled
        );
    }
}
