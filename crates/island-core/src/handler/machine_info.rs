//! Discovery events that describe the agent's own machine.

use island_types::error::HandlerError;
use island_types::event::{AgentEvent, AgentEventKind, AgentEventPayload};
use tracing::debug;

use crate::facade::AgentMachineFacade;

pub fn update_machine_os(
    facade: &AgentMachineFacade,
    event: &AgentEvent,
) -> Result<(), HandlerError> {
    let AgentEventPayload::OsDiscovery { os, version } = event.payload() else {
        return Err(HandlerError::UnexpectedEvent {
            expected: AgentEventKind::OsDiscovery,
            actual: event.kind(),
        });
    };

    let mut machine = facade.get_agent_machine(event.source())?;
    machine.operating_system = Some(*os);
    machine.operating_system_version = version.clone();
    facade.upsert_machine(&machine)?;
    debug!(machine_id = %machine.id(), os = %os, "machine operating system updated");
    Ok(())
}

pub fn update_machine_hostname(
    facade: &AgentMachineFacade,
    event: &AgentEvent,
) -> Result<(), HandlerError> {
    let AgentEventPayload::HostnameDiscovery { name } = event.payload() else {
        return Err(HandlerError::UnexpectedEvent {
            expected: AgentEventKind::HostnameDiscovery,
            actual: event.kind(),
        });
    };

    let mut machine = facade.get_agent_machine(event.source())?;
    machine.hostname = name.clone();
    facade.upsert_machine(&machine)?;
    debug!(machine_id = %machine.id(), hostname = %name, "machine hostname updated");
    Ok(())
}
