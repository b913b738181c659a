//! Reconciles an agent registration with the machines already known.
//!
//! Agents identify their host by hardware id and network interfaces. The
//! same machine can be seen first as a scan target (interfaces only) and
//! later as an agent host (hardware id too), so a registration either
//! enriches an existing machine or creates a new one.

use std::sync::Arc;

use island_types::agent::{Agent, AgentRegistrationData};
use island_types::error::{HandlerError, ReconciliationError, RepositoryError};
use island_types::island_event::{IslandEvent, IslandEventTopic};
use island_types::machine::{Machine, MachineId};
use tracing::{error, info, warn};

use crate::repository::{AgentRepository, MachineRepository};

pub struct HandleAgentRegistration {
    machine_repository: Arc<dyn MachineRepository>,
    agent_repository: Arc<dyn AgentRepository>,
}

impl HandleAgentRegistration {
    pub fn new(
        machine_repository: Arc<dyn MachineRepository>,
        agent_repository: Arc<dyn AgentRepository>,
    ) -> Self {
        Self {
            machine_repository,
            agent_repository,
        }
    }

    /// Topic handler entry point for AGENT_REGISTERED.
    pub fn handle_event(&self, event: &IslandEvent) -> Result<(), HandlerError> {
        match event {
            IslandEvent::AgentRegistered { registration } => self.handle(registration).map(|_| ()),
            other => Err(HandlerError::UnexpectedTopic {
                expected: IslandEventTopic::AgentRegistered,
                actual: other.topic(),
            }),
        }
    }

    /// Reconcile the registering agent's machine and record the agent.
    ///
    /// Returns the machine the agent was attached to. On a hardware id
    /// conflict nothing is written.
    pub fn handle(&self, registration: &AgentRegistrationData) -> Result<Machine, HandlerError> {
        let machine = self.update_machine_repository(registration)?;
        self.add_agent(registration, machine.id())?;
        Ok(machine)
    }

    fn update_machine_repository(
        &self,
        registration: &AgentRegistrationData,
    ) -> Result<Machine, HandlerError> {
        let machine = match self.find_existing_machine(registration)? {
            Some(machine) => machine,
            None => Machine::new(self.machine_repository.get_new_id()?),
        };

        let machine = merge_registration(machine, registration)?;
        self.machine_repository.upsert_machine(&machine)?;
        Ok(machine)
    }

    fn find_existing_machine(
        &self,
        registration: &AgentRegistrationData,
    ) -> Result<Option<Machine>, RepositoryError> {
        match self
            .machine_repository
            .get_machine_by_hardware_id(registration.machine_hardware_id)
        {
            Ok(machine) => return Ok(Some(machine)),
            Err(err) if err.is_unknown_record() => {}
            Err(err) => return Err(err),
        }

        let mut candidates: Vec<Machine> = Vec::new();
        for interface in &registration.network_interfaces {
            match self.machine_repository.get_machines_by_ip(interface.ip()) {
                Ok(machines) => {
                    for machine in machines {
                        if !candidates.iter().any(|c| c.id() == machine.id()) {
                            candidates.push(machine);
                        }
                    }
                }
                Err(err) if err.is_unknown_record() => {}
                Err(err) => return Err(err),
            }
        }

        if candidates.len() > 1 {
            let ids: Vec<MachineId> = candidates.iter().map(Machine::id).collect();
            warn!(
                agent_id = %registration.id,
                candidates = ?ids,
                chosen = %ids[0],
                "registration interfaces match several machines"
            );
        }
        Ok(candidates.into_iter().next())
    }

    fn add_agent(
        &self,
        registration: &AgentRegistrationData,
        machine_id: MachineId,
    ) -> Result<(), RepositoryError> {
        let agent = Agent {
            id: registration.id,
            machine_id,
            start_time: registration.start_time,
            parent_id: registration.parent_id,
            cc_server: registration.cc_server,
            stop_time: None,
        };
        self.agent_repository.insert_agent(&agent)?;
        info!(agent_id = %agent.id, machine_id = %machine_id, "agent registered");
        Ok(())
    }
}

/// Fold the registration into `machine`: incoming interfaces first, then the
/// machine's interfaces on addresses the registration did not report. The
/// hardware id is backfilled when the machine has none.
fn merge_registration(
    mut machine: Machine,
    registration: &AgentRegistrationData,
) -> Result<Machine, ReconciliationError> {
    if let Some(existing) = machine.hardware_id {
        if existing != registration.machine_hardware_id {
            error!(
                agent_id = %registration.id,
                machine_id = %machine.id(),
                existing = %existing,
                incoming = %registration.machine_hardware_id,
                "hardware id mismatch while reconciling registration"
            );
            return Err(ReconciliationError::HardwareIdMismatch {
                agent_id: registration.id,
                machine_id: machine.id(),
                existing,
                incoming: registration.machine_hardware_id,
            });
        }
    }

    let incoming = &registration.network_interfaces;
    let retained: Vec<_> = machine
        .network_interfaces()
        .iter()
        .filter(|old| !incoming.iter().any(|new| new.ip() == old.ip()))
        .copied()
        .collect();
    machine.set_network_interfaces(incoming.iter().copied().chain(retained));
    machine.hardware_id = Some(registration.machine_hardware_id);
    Ok(machine)
}
