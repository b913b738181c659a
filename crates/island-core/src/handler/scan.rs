//! Turns scan results into machines and network map edges.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use island_types::error::HandlerError;
use island_types::event::{AgentEvent, AgentEventKind, AgentEventPayload, PortStatus};
use island_types::node::CommunicationType;
use tracing::debug;

use super::get_or_create_target_machine;
use crate::facade::AgentMachineFacade;
use crate::repository::{MachineRepository, NodeRepository};

pub struct ScanEventHandler {
    agent_machine_facade: Arc<AgentMachineFacade>,
    machine_repository: Arc<dyn MachineRepository>,
    node_repository: Arc<dyn NodeRepository>,
}

impl ScanEventHandler {
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

    /// A ping that got an answer proves the target exists. Records the
    /// target machine (with its OS, if fingerprinted and not yet known) and
    /// a `Scanned` edge from the scanning agent's machine.
    pub fn handle_ping_scan_event(&self, event: &AgentEvent) -> Result<(), HandlerError> {
        let AgentEventPayload::PingScan {
            response_received,
            os,
        } = event.payload()
        else {
            return Err(HandlerError::UnexpectedEvent {
                expected: AgentEventKind::PingScan,
                actual: event.kind(),
            });
        };
        if !response_received {
            return Ok(());
        }

        let target_ip = event.target().ok_or(HandlerError::MissingField("target"))?;
        let mut target = get_or_create_target_machine(self.machine_repository.as_ref(), target_ip)?;
        if let Some(os) = os {
            if target.operating_system.is_none() {
                target.operating_system = Some(*os);
                self.machine_repository.upsert_machine(&target)?;
            }
        }

        let source = self.agent_machine_facade.get_agent_machine(event.source())?;
        self.node_repository
            .upsert_communication(source.id(), target.id(), CommunicationType::Scanned)?;
        debug!(source = %source.id(), target = %target.id(), "ping scan recorded");
        Ok(())
    }

    /// Records open ports found by a TCP scan. Scans with no open port
    /// leave no trace.
    pub fn handle_tcp_scan_event(&self, event: &AgentEvent) -> Result<(), HandlerError> {
        let AgentEventPayload::TcpScan { ports } = event.payload() else {
            return Err(HandlerError::UnexpectedEvent {
                expected: AgentEventKind::TcpScan,
                actual: event.kind(),
            });
        };
        let open_ports: BTreeSet<u16> = ports
            .iter()
            .filter(|(_, status)| **status == PortStatus::Open)
            .map(|(port, _)| *port)
            .collect();
        if open_ports.is_empty() {
            return Ok(());
        }

        let target_ip = event.target().ok_or(HandlerError::MissingField("target"))?;
        let target = get_or_create_target_machine(self.machine_repository.as_ref(), target_ip)?;
        let source = self.agent_machine_facade.get_agent_machine(event.source())?;

        self.node_repository
            .upsert_communication(source.id(), target.id(), CommunicationType::Scanned)?;
        let connections = BTreeMap::from([(target.id(), open_ports)]);
        self.node_repository.upsert_tcp_connections(source.id(), &connections)?;
        debug!(source = %source.id(), target = %target.id(), "tcp scan recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use island_types::agent::Agent;
    use island_types::machine::{Machine, MachineId, OperatingSystem};

    use super::*;
    use crate::repository::AgentRepository;
    use crate::testing::{FakeAgentRepository, FakeMachineRepository, FakeNodeRepository, agent_on};

    const TARGET: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 50);

    struct Fixture {
        handler: ScanEventHandler,
        machines: Arc<FakeMachineRepository>,
        nodes: Arc<FakeNodeRepository>,
        agent: Agent,
    }

    fn fixture(extra: Vec<Machine>) -> Fixture {
        let mut known = vec![Machine::new(MachineId(1))];
        known.extend(extra);
        let machines = Arc::new(FakeMachineRepository::with_machines(known));
        let agents = Arc::new(FakeAgentRepository::default());
        let agent = agent_on(MachineId(1));
        agents.insert_agent(&agent).unwrap();
        let nodes = Arc::new(FakeNodeRepository::default());
        let facade = Arc::new(AgentMachineFacade::new(agents, machines.clone()));
        Fixture {
            handler: ScanEventHandler::new(facade, machines.clone(), nodes.clone()),
            machines,
            nodes,
            agent,
        }
    }

    fn ping(fixture: &Fixture, response_received: bool, os: Option<OperatingSystem>) -> AgentEvent {
        AgentEvent::new(fixture.agent.id, AgentEventPayload::PingScan { response_received, os })
            .with_target(TARGET)
    }

    #[test]
    fn test_answered_ping_creates_target_and_edge() {
        let f = fixture(vec![]);

        f.handler
            .handle_ping_scan_event(&ping(&f, true, Some(OperatingSystem::Windows)))
            .unwrap();

        let target = f.machines.get_machines_by_ip(TARGET).unwrap().remove(0);
        assert_eq!(target.operating_system, Some(OperatingSystem::Windows));
        assert_eq!(
            *f.nodes.communications.lock(),
            vec![(MachineId(1), target.id(), CommunicationType::Scanned)]
        );
    }

    #[test]
    fn test_ping_keeps_known_operating_system() {
        let mut known = Machine::new(MachineId(5))
            .with_network_interfaces([TARGET.to_string().parse().unwrap()]);
        known.operating_system = Some(OperatingSystem::Linux);
        let f = fixture(vec![known]);

        f.handler
            .handle_ping_scan_event(&ping(&f, true, Some(OperatingSystem::Windows)))
            .unwrap();

        assert_eq!(
            f.machines.machine(MachineId(5)).unwrap().operating_system,
            Some(OperatingSystem::Linux)
        );
    }

    #[test]
    fn test_unanswered_ping_is_ignored() {
        let f = fixture(vec![]);
        f.handler.handle_ping_scan_event(&ping(&f, false, None)).unwrap();
        assert_eq!(f.machines.len(), 1);
        assert!(f.nodes.communications.lock().is_empty());
    }

    #[test]
    fn test_ping_without_target_is_rejected() {
        let f = fixture(vec![]);
        let event = AgentEvent::new(
            f.agent.id,
            AgentEventPayload::PingScan {
                response_received: true,
                os: None,
            },
        );
        assert!(matches!(
            f.handler.handle_ping_scan_event(&event),
            Err(HandlerError::MissingField("target"))
        ));
    }

    #[test]
    fn test_tcp_scan_records_open_ports_only() {
        let f = fixture(vec![]);
        let ports = BTreeMap::from([
            (22, PortStatus::Open),
            (80, PortStatus::Closed),
            (443, PortStatus::Open),
        ]);
        let event = AgentEvent::new(f.agent.id, AgentEventPayload::TcpScan { ports })
            .with_target(TARGET);

        f.handler.handle_tcp_scan_event(&event).unwrap();

        let target = f.machines.get_machines_by_ip(TARGET).unwrap().remove(0);
        let recorded = f.nodes.tcp_connections.lock().clone();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, MachineId(1));
        assert_eq!(recorded[0].1[&target.id()], BTreeSet::from([22, 443]));
    }

    #[test]
    fn test_tcp_scan_without_open_ports_is_ignored() {
        let f = fixture(vec![]);
        let ports = BTreeMap::from([(80, PortStatus::Closed)]);
        let event = AgentEvent::new(f.agent.id, AgentEventPayload::TcpScan { ports })
            .with_target(TARGET);

        f.handler.handle_tcp_scan_event(&event).unwrap();

        assert_eq!(f.machines.len(), 1);
        assert!(f.nodes.tcp_connections.lock().is_empty());
    }
}
