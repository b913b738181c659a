use std::sync::Arc;

use island_types::error::HandlerError;
use island_types::event::{AgentEvent, AgentEventKind, AgentEventPayload};
use island_types::node::CommunicationType;
use tracing::debug;

use super::get_or_create_target_machine;
use crate::facade::AgentMachineFacade;
use crate::repository::{MachineRepository, NodeRepository};

/// Adds an `Exploited` edge to the network map for every successful
/// exploitation. Failed attempts are only kept in the event log.
pub struct UpdateNodesOnExploitation {
    agent_machine_facade: Arc<AgentMachineFacade>,
    machine_repository: Arc<dyn MachineRepository>,
    node_repository: Arc<dyn NodeRepository>,
}

impl UpdateNodesOnExploitation {
    pub fn new(
        agent_machine_facade: Arc<AgentMachineFacade>,
        machine_repository: Arc<dyn MachineRepository>,
        node_repository: Arc<dyn NodeRepository>,
    ) -> Self {
        Self {
            agent_machine_facade,
            machine_repository,
            node_repository,
        }
    }

    pub fn handle(&self, event: &AgentEvent) -> Result<(), HandlerError> {
        let AgentEventPayload::Exploitation { success, .. } = event.payload() else {
            return Err(HandlerError::UnexpectedEvent {
                expected: AgentEventKind::Exploitation,
                actual: event.kind(),
            });
        };
        if !success {
            return Ok(());
        }

        let target_ip = event.target().ok_or(HandlerError::MissingField("target"))?;
        let target = get_or_create_target_machine(self.machine_repository.as_ref(), target_ip)?;
        let source = self.agent_machine_facade.get_agent_machine(event.source())?;
        self.node_repository
            .upsert_communication(source.id(), target.id(), CommunicationType::Exploited)?;
        debug!(source = %source.id(), target = %target.id(), "exploitation recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use island_types::machine::{Machine, MachineId};

    use super::*;
    use crate::repository::AgentRepository;
    use crate::testing::{FakeAgentRepository, FakeMachineRepository, FakeNodeRepository, agent_on};

    fn exploitation(agent: &island_types::agent::Agent, success: bool) -> AgentEvent {
        AgentEvent::new(
            agent.id,
            AgentEventPayload::Exploitation {
                exploiter_name: "SSHExploiter".into(),
                success,
                error_message: String::new(),
            },
        )
        .with_target(Ipv4Addr::new(10, 0, 0, 7))
    }

    #[test]
    fn test_successful_exploitation_adds_edge_once_per_event() {
        let machines =
            Arc::new(FakeMachineRepository::with_machines(vec![Machine::new(MachineId(1))]));
        let agents = Arc::new(FakeAgentRepository::default());
        let agent = agent_on(MachineId(1));
        agents.insert_agent(&agent).unwrap();
        let nodes = Arc::new(FakeNodeRepository::default());
        let facade = Arc::new(AgentMachineFacade::new(agents, machines.clone()));
        let handler = UpdateNodesOnExploitation::new(facade, machines, nodes.clone());

        handler.handle(&exploitation(&agent, false)).unwrap();
        assert!(nodes.communications.lock().is_empty());

        handler.handle(&exploitation(&agent, true)).unwrap();
        let communications = nodes.communications.lock().clone();
        assert_eq!(communications.len(), 1);
        assert_eq!(communications[0].0, MachineId(1));
        assert_eq!(communications[0].2, CommunicationType::Exploited);
    }
}
