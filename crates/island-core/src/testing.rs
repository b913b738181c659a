//! Hand-written repository doubles shared by the unit tests in this crate.

use std::collections::{BTreeMap, BTreeSet};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use island_types::agent::{Agent, AgentId};
use island_types::agent_configuration::AgentConfiguration;
use island_types::credentials::Credentials;
use island_types::error::RepositoryError;
use island_types::event::{AgentEvent, AgentEventKind};
use island_types::island_event::IslandMode;
use island_types::machine::{HardwareId, Machine, MachineId};
use island_types::node::{CommunicationType, Node};
use parking_lot::Mutex;

use crate::repository::{
    AgentConfigurationRepository, AgentEventRepository, AgentLogRepository, AgentRepository,
    CredentialsRepository, MachineRepository, NodeRepository, SimulationRepository,
};

pub fn time(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
}

pub fn cc_server() -> SocketAddr {
    "10.0.0.1:5000".parse().unwrap()
}

pub fn agent_on(machine_id: MachineId) -> Agent {
    Agent {
        id: AgentId::new(),
        machine_id,
        start_time: time(0),
        parent_id: None,
        cc_server: cc_server(),
        stop_time: None,
    }
}

fn unknown(what: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::UnknownRecord(what.to_string())
}

#[derive(Default)]
pub struct FakeMachineRepository {
    machines: Mutex<BTreeMap<MachineId, Machine>>,
    next_id: AtomicU32,
    pub upserts: AtomicUsize,
    pub lookup_error: Mutex<Option<RepositoryError>>,
}

impl FakeMachineRepository {
    pub fn with_machines(machines: Vec<Machine>) -> Self {
        let next_id = machines.iter().map(|m| m.id().0 + 1).max().unwrap_or(0);
        Self {
            machines: Mutex::new(machines.into_iter().map(|m| (m.id(), m)).collect()),
            next_id: AtomicU32::new(next_id),
            ..Self::default()
        }
    }

    pub fn machine(&self, id: MachineId) -> Option<Machine> {
        self.machines.lock().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.machines.lock().len()
    }

    fn check_lookup(&self) -> Result<(), RepositoryError> {
        match self.lookup_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl MachineRepository for FakeMachineRepository {
    fn get_new_id(&self) -> Result<MachineId, RepositoryError> {
        Ok(MachineId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    fn upsert_machine(&self, machine: &Machine) -> Result<(), RepositoryError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.machines.lock().insert(machine.id(), machine.clone());
        Ok(())
    }

    fn get_machine_by_id(&self, id: MachineId) -> Result<Machine, RepositoryError> {
        self.machine(id).ok_or_else(|| unknown(id))
    }

    fn get_machine_by_hardware_id(
        &self,
        hardware_id: HardwareId,
    ) -> Result<Machine, RepositoryError> {
        self.check_lookup()?;
        self.machines
            .lock()
            .values()
            .find(|m| m.hardware_id == Some(hardware_id))
            .cloned()
            .ok_or_else(|| unknown(hardware_id))
    }

    fn get_machines_by_ip(&self, ip: Ipv4Addr) -> Result<Vec<Machine>, RepositoryError> {
        self.check_lookup()?;
        let found: Vec<Machine> = self
            .machines
            .lock()
            .values()
            .filter(|m| m.has_ip(ip))
            .cloned()
            .collect();
        if found.is_empty() { Err(unknown(ip)) } else { Ok(found) }
    }

    fn get_machines(&self) -> Result<Vec<Machine>, RepositoryError> {
        Ok(self.machines.lock().values().cloned().collect())
    }

    fn reset(&self) -> Result<(), RepositoryError> {
        self.machines.lock().clear();
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAgentRepository {
    records: Mutex<Vec<Agent>>,
    pub upsert_error: Mutex<Option<RepositoryError>>,
}

impl FakeAgentRepository {
    pub fn records(&self) -> Vec<Agent> {
        self.records.lock().clone()
    }
}

impl AgentRepository for FakeAgentRepository {
    fn insert_agent(&self, agent: &Agent) -> Result<(), RepositoryError> {
        self.records.lock().push(agent.clone());
        Ok(())
    }

    fn upsert_agent(&self, agent: &Agent) -> Result<(), RepositoryError> {
        if let Some(err) = self.upsert_error.lock().clone() {
            return Err(err);
        }
        let mut records = self.records.lock();
        match records.iter_mut().rev().find(|a| a.id == agent.id) {
            Some(existing) => *existing = agent.clone(),
            None => records.push(agent.clone()),
        }
        Ok(())
    }

    fn get_agent_by_id(&self, id: AgentId) -> Result<Agent, RepositoryError> {
        self.records
            .lock()
            .iter()
            .rev()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| unknown(id))
    }

    fn get_agents(&self) -> Result<Vec<Agent>, RepositoryError> {
        Ok(self.records())
    }

    fn get_running_agents(&self) -> Result<Vec<Agent>, RepositoryError> {
        Ok(self.records().into_iter().filter(Agent::is_running).collect())
    }

    fn reset(&self) -> Result<(), RepositoryError> {
        self.records.lock().clear();
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeEventRepository {
    pub events: Mutex<Vec<AgentEvent>>,
}

impl AgentEventRepository for FakeEventRepository {
    fn save_event(&self, event: &AgentEvent) -> Result<(), RepositoryError> {
        self.events.lock().push(event.clone());
        Ok(())
    }

    fn get_events(&self) -> Result<Vec<AgentEvent>, RepositoryError> {
        Ok(self.events.lock().clone())
    }

    fn get_events_by_type(&self, kind: AgentEventKind) -> Result<Vec<AgentEvent>, RepositoryError> {
        Ok(self.events.lock().iter().filter(|e| e.kind() == kind).cloned().collect())
    }

    fn get_events_by_tag(&self, tag: &str) -> Result<Vec<AgentEvent>, RepositoryError> {
        Ok(self.events.lock().iter().filter(|e| e.has_tag(tag)).cloned().collect())
    }

    fn get_events_by_source(&self, source: AgentId) -> Result<Vec<AgentEvent>, RepositoryError> {
        Ok(self.events.lock().iter().filter(|e| e.source() == source).cloned().collect())
    }

    fn reset(&self) -> Result<(), RepositoryError> {
        self.events.lock().clear();
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAgentLogRepository {
    pub logs: Mutex<BTreeMap<AgentId, String>>,
}

impl AgentLogRepository for FakeAgentLogRepository {
    fn upsert_agent_log(&self, agent_id: AgentId, log: &str) -> Result<(), RepositoryError> {
        self.logs.lock().insert(agent_id, log.to_string());
        Ok(())
    }

    fn get_agent_log(&self, agent_id: AgentId) -> Result<String, RepositoryError> {
        self.logs.lock().get(&agent_id).cloned().ok_or_else(|| unknown(agent_id))
    }

    fn reset(&self) -> Result<(), RepositoryError> {
        self.logs.lock().clear();
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCredentialsRepository {
    pub configured: Mutex<Vec<Credentials>>,
    pub stolen: Mutex<Vec<Credentials>>,
}

impl CredentialsRepository for FakeCredentialsRepository {
    fn get_configured_credentials(&self) -> Result<Vec<Credentials>, RepositoryError> {
        Ok(self.configured.lock().clone())
    }

    fn get_stolen_credentials(&self) -> Result<Vec<Credentials>, RepositoryError> {
        Ok(self.stolen.lock().clone())
    }

    fn get_all_credentials(&self) -> Result<Vec<Credentials>, RepositoryError> {
        let mut all = self.configured.lock().clone();
        all.extend(self.stolen.lock().iter().cloned());
        Ok(all)
    }

    fn save_configured_credentials(
        &self,
        credentials: &[Credentials],
    ) -> Result<(), RepositoryError> {
        self.configured.lock().extend_from_slice(credentials);
        Ok(())
    }

    fn save_stolen_credentials(&self, credentials: &[Credentials]) -> Result<(), RepositoryError> {
        self.stolen.lock().extend_from_slice(credentials);
        Ok(())
    }

    fn remove_configured_credentials(&self) -> Result<(), RepositoryError> {
        self.configured.lock().clear();
        Ok(())
    }

    fn remove_stolen_credentials(&self) -> Result<(), RepositoryError> {
        self.stolen.lock().clear();
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeNodeRepository {
    pub communications: Mutex<Vec<(MachineId, MachineId, CommunicationType)>>,
    pub tcp_connections: Mutex<Vec<(MachineId, BTreeMap<MachineId, BTreeSet<u16>>)>>,
}

impl NodeRepository for FakeNodeRepository {
    fn upsert_communication(
        &self,
        source: MachineId,
        destination: MachineId,
        communication: CommunicationType,
    ) -> Result<(), RepositoryError> {
        self.communications.lock().push((source, destination, communication));
        Ok(())
    }

    fn upsert_tcp_connections(
        &self,
        source: MachineId,
        connections: &BTreeMap<MachineId, BTreeSet<u16>>,
    ) -> Result<(), RepositoryError> {
        self.tcp_connections.lock().push((source, connections.clone()));
        Ok(())
    }

    fn get_nodes(&self) -> Result<Vec<Node>, RepositoryError> {
        let mut nodes: BTreeMap<MachineId, Node> = BTreeMap::new();
        for (source, destination, communication) in self.communications.lock().iter() {
            nodes
                .entry(*source)
                .or_insert_with(|| Node::new(*source))
                .connections
                .entry(*destination)
                .or_default()
                .insert(*communication);
        }
        Ok(nodes.into_values().collect())
    }

    fn reset(&self) -> Result<(), RepositoryError> {
        self.communications.lock().clear();
        self.tcp_connections.lock().clear();
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAgentConfigurationRepository {
    pub configuration: Mutex<AgentConfiguration>,
    pub resets: AtomicUsize,
}

impl AgentConfigurationRepository for FakeAgentConfigurationRepository {
    fn get_configuration(&self) -> Result<AgentConfiguration, RepositoryError> {
        Ok(self.configuration.lock().clone())
    }

    fn store_configuration(
        &self,
        configuration: &AgentConfiguration,
    ) -> Result<(), RepositoryError> {
        *self.configuration.lock() = configuration.clone();
        Ok(())
    }

    fn reset_to_default(&self) -> Result<(), RepositoryError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        *self.configuration.lock() = AgentConfiguration::default();
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSimulationRepository {
    pub mode: Mutex<IslandMode>,
    pub terminate_signal_time: Mutex<Option<DateTime<Utc>>>,
}

impl SimulationRepository for FakeSimulationRepository {
    fn get_mode(&self) -> Result<IslandMode, RepositoryError> {
        Ok(*self.mode.lock())
    }

    fn set_mode(&self, mode: IslandMode) -> Result<(), RepositoryError> {
        *self.mode.lock() = mode;
        Ok(())
    }

    fn get_terminate_signal_time(&self) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        Ok(*self.terminate_signal_time.lock())
    }

    fn set_terminate_signal_time(&self, time: DateTime<Utc>) -> Result<(), RepositoryError> {
        *self.terminate_signal_time.lock() = Some(time);
        Ok(())
    }
}
