//! Signals agents pick up when they poll the Island.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use island_types::agent::{AgentId, AgentSignals};
use island_types::error::RepositoryError;
use tracing::info;

use crate::repository::{AgentRepository, SimulationRepository};

pub struct AgentSignalsService {
    simulation_repository: Arc<dyn SimulationRepository>,
    agent_repository: Arc<dyn AgentRepository>,
}

impl AgentSignalsService {
    pub fn new(
        simulation_repository: Arc<dyn SimulationRepository>,
        agent_repository: Arc<dyn AgentRepository>,
    ) -> Self {
        Self {
            simulation_repository,
            agent_repository,
        }
    }

    /// Signals for one agent. An agent is told to terminate only if it
    /// started before the latest terminate request; agents launched
    /// afterwards keep running.
    pub fn get_signals(&self, agent_id: AgentId) -> Result<AgentSignals, RepositoryError> {
        let agent = self.agent_repository.get_agent_by_id(agent_id)?;
        let terminate = self
            .simulation_repository
            .get_terminate_signal_time()?
            .filter(|signal_time| agent.start_time <= *signal_time);
        Ok(AgentSignals { terminate })
    }

    pub fn on_terminate_agents_signal(
        &self,
        timestamp: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.simulation_repository.set_terminate_signal_time(timestamp)?;
        info!(timestamp = %timestamp, "terminate signal recorded for running agents");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use island_types::machine::MachineId;

    use super::*;
    use crate::testing::{FakeAgentRepository, FakeSimulationRepository, agent_on, time};

    fn service() -> (AgentSignalsService, Arc<FakeAgentRepository>) {
        let agents = Arc::new(FakeAgentRepository::default());
        let service = AgentSignalsService::new(
            Arc::new(FakeSimulationRepository::default()),
            agents.clone(),
        );
        (service, agents)
    }

    #[test]
    fn test_no_signal_before_terminate_request() {
        let (service, agents) = service();
        let agent = agent_on(MachineId(1));
        agents.insert_agent(&agent).unwrap();

        assert_eq!(service.get_signals(agent.id).unwrap(), AgentSignals::default());
    }

    #[test]
    fn test_agents_started_before_request_terminate() {
        let (service, agents) = service();
        let early = agent_on(MachineId(1));
        let mut late = agent_on(MachineId(1));
        late.start_time = time(100);
        agents.insert_agent(&early).unwrap();
        agents.insert_agent(&late).unwrap();

        service.on_terminate_agents_signal(time(50)).unwrap();

        assert_eq!(service.get_signals(early.id).unwrap().terminate, Some(time(50)));
        assert_eq!(service.get_signals(late.id).unwrap().terminate, None);
    }

    #[test]
    fn test_unknown_agent_is_an_error() {
        let (service, _) = service();
        assert!(service.get_signals(AgentId::new()).unwrap_err().is_unknown_record());
    }
}
