//! Subscribes the Island's handlers to both buses.
//!
//! Everything is constructed explicitly by the caller and passed in; there
//! is no global container. Subscription must finish before the queues are
//! shared with publishing threads.

use std::sync::Arc;
use std::time::Duration;

use island_types::config::IslandMachineConfig;
use island_types::error::HandlerError;
use island_types::event::AgentEventKind;
use island_types::island_event::{IslandEvent, IslandEventTopic};
use tracing::{error, info};

use crate::event::{AgentEventQueue, subscriber};
use crate::facade::AgentMachineFacade;
use crate::handler::{
    ScanEventHandler, UpdateNodesOnExploitation, save_event_to_event_repository,
    save_stolen_credentials, update_agent_shutdown_status, update_machine_hostname,
    update_machine_os,
};
use crate::island_event::{IslandEventQueue, handler};
use crate::island_handler::{
    AgentHeartbeatHandler, HandleAgentRegistration, ResetMachineRepository,
    SetAgentConfigurationPerIslandMode, reset_agent_configuration,
};
use crate::periodic::PeriodicCaller;
use crate::repository::{
    AgentConfigurationRepository, AgentEventRepository, AgentLogRepository, AgentRepository,
    CredentialsRepository, MachineRepository, NodeRepository, SimulationRepository,
};
use crate::service::AgentSignalsService;

/// Every repository the handlers write to.
#[derive(Clone)]
pub struct Repositories {
    pub machines: Arc<dyn MachineRepository>,
    pub agents: Arc<dyn AgentRepository>,
    pub agent_events: Arc<dyn AgentEventRepository>,
    pub agent_logs: Arc<dyn AgentLogRepository>,
    pub credentials: Arc<dyn CredentialsRepository>,
    pub nodes: Arc<dyn NodeRepository>,
    pub agent_configuration: Arc<dyn AgentConfigurationRepository>,
    pub simulation: Arc<dyn SimulationRepository>,
}

pub fn setup_agent_event_handlers<Q>(
    queue: &mut Q,
    repositories: &Repositories,
    agent_machine_facade: &Arc<AgentMachineFacade>,
) where
    Q: AgentEventQueue + ?Sized,
{
    let events = Arc::clone(&repositories.agent_events);
    queue.subscribe_all_events(subscriber(move |event| {
        save_event_to_event_repository(events.as_ref(), event)
    }));

    let credentials = Arc::clone(&repositories.credentials);
    queue.subscribe_type(
        AgentEventKind::CredentialsStolen,
        subscriber(move |event| save_stolen_credentials(credentials.as_ref(), event)),
    );

    let agents = Arc::clone(&repositories.agents);
    queue.subscribe_type(
        AgentEventKind::AgentShutdown,
        subscriber(move |event| update_agent_shutdown_status(agents.as_ref(), event)),
    );

    let facade = Arc::clone(agent_machine_facade);
    queue.subscribe_type(
        AgentEventKind::OsDiscovery,
        subscriber(move |event| update_machine_os(&facade, event)),
    );

    let facade = Arc::clone(agent_machine_facade);
    queue.subscribe_type(
        AgentEventKind::HostnameDiscovery,
        subscriber(move |event| update_machine_hostname(&facade, event)),
    );

    let scan = Arc::new(ScanEventHandler::new(
        Arc::clone(agent_machine_facade),
        Arc::clone(&repositories.machines),
        Arc::clone(&repositories.nodes),
    ));
    let ping = Arc::clone(&scan);
    queue.subscribe_type(
        AgentEventKind::PingScan,
        subscriber(move |event| ping.handle_ping_scan_event(event)),
    );
    queue.subscribe_type(
        AgentEventKind::TcpScan,
        subscriber(move |event| scan.handle_tcp_scan_event(event)),
    );

    let exploitation = UpdateNodesOnExploitation::new(
        Arc::clone(agent_machine_facade),
        Arc::clone(&repositories.machines),
        Arc::clone(&repositories.nodes),
    );
    queue.subscribe_type(
        AgentEventKind::Exploitation,
        subscriber(move |event| exploitation.handle(event)),
    );

    info!("agent event handlers subscribed");
}

pub fn setup_island_event_handlers<Q>(
    queue: &mut Q,
    repositories: &Repositories,
    agent_machine_facade: &Arc<AgentMachineFacade>,
    heartbeat_handler: &Arc<AgentHeartbeatHandler>,
    agent_signals: &Arc<AgentSignalsService>,
    island_machine: IslandMachineConfig,
) where
    Q: IslandEventQueue + ?Sized,
{
    subscribe_registration(queue, repositories, agent_machine_facade);
    subscribe_heartbeat(queue, heartbeat_handler);
    subscribe_reset_agent_configuration(queue, repositories);
    subscribe_clear_simulation_data(
        queue,
        repositories,
        agent_machine_facade,
        heartbeat_handler,
        island_machine,
    );
    subscribe_set_island_mode(queue, repositories);
    subscribe_terminate_agents(queue, agent_signals);

    info!("island event handlers subscribed");
}

/// A stopped periodic caller that infers stop times of silent agents.
pub fn heartbeat_caller(
    heartbeat_handler: Arc<AgentHeartbeatHandler>,
    interval: Duration,
) -> PeriodicCaller {
    PeriodicCaller::new("AgentHeartbeatCheck", interval, move || {
        if let Err(err) = heartbeat_handler.update_agents_stop_time_from_heartbeat() {
            error!(error = %err, "failed to update agent stop times from heartbeats");
        }
    })
}

fn unexpected(expected: IslandEventTopic, event: &IslandEvent) -> HandlerError {
    HandlerError::UnexpectedTopic {
        expected,
        actual: event.topic(),
    }
}

fn subscribe_registration<Q: IslandEventQueue + ?Sized>(
    queue: &mut Q,
    repositories: &Repositories,
    agent_machine_facade: &Arc<AgentMachineFacade>,
) {
    let topic = IslandEventTopic::AgentRegistered;

    let registration = HandleAgentRegistration::new(
        Arc::clone(&repositories.machines),
        Arc::clone(&repositories.agents),
    );
    queue.subscribe(topic, handler(move |event| registration.handle_event(event)));

    let facade = Arc::clone(agent_machine_facade);
    queue.subscribe(
        topic,
        handler(move |event| match event {
            IslandEvent::AgentRegistered { registration } => {
                facade.forget_agent(registration.id);
                Ok(())
            }
            other => Err(unexpected(topic, other)),
        }),
    );
}

fn subscribe_heartbeat<Q: IslandEventQueue + ?Sized>(
    queue: &mut Q,
    heartbeat_handler: &Arc<AgentHeartbeatHandler>,
) {
    let heartbeat = Arc::clone(heartbeat_handler);
    queue.subscribe(
        IslandEventTopic::AgentHeartbeat,
        handler(move |event| heartbeat.handle_event(event)),
    );
}

fn subscribe_reset_agent_configuration<Q: IslandEventQueue + ?Sized>(
    queue: &mut Q,
    repositories: &Repositories,
) {
    let configuration = Arc::clone(&repositories.agent_configuration);
    queue.subscribe(
        IslandEventTopic::ResetAgentConfiguration,
        handler(move |_| Ok(reset_agent_configuration(configuration.as_ref())?)),
    );
}

fn subscribe_clear_simulation_data<Q: IslandEventQueue + ?Sized>(
    queue: &mut Q,
    repositories: &Repositories,
    agent_machine_facade: &Arc<AgentMachineFacade>,
    heartbeat_handler: &Arc<AgentHeartbeatHandler>,
    island_machine: IslandMachineConfig,
) {
    let topic = IslandEventTopic::ClearSimulationData;

    let credentials = Arc::clone(&repositories.credentials);
    queue.subscribe(topic, handler(move |_| Ok(credentials.remove_stolen_credentials()?)));

    let reset_machines =
        ResetMachineRepository::new(Arc::clone(&repositories.machines), island_machine);
    queue.subscribe(topic, handler(move |_| Ok(reset_machines.reset()?)));

    let facade = Arc::clone(agent_machine_facade);
    queue.subscribe(
        topic,
        handler(move |_| {
            facade.reset_cache();
            Ok(())
        }),
    );

    let heartbeat = Arc::clone(heartbeat_handler);
    queue.subscribe(
        topic,
        handler(move |_| {
            heartbeat.reset();
            Ok(())
        }),
    );

    let events = Arc::clone(&repositories.agent_events);
    queue.subscribe(topic, handler(move |_| Ok(events.reset()?)));

    let logs = Arc::clone(&repositories.agent_logs);
    queue.subscribe(topic, handler(move |_| Ok(logs.reset()?)));

    let agents = Arc::clone(&repositories.agents);
    queue.subscribe(topic, handler(move |_| Ok(agents.reset()?)));

    let nodes = Arc::clone(&repositories.nodes);
    queue.subscribe(topic, handler(move |_| Ok(nodes.reset()?)));
}

fn subscribe_set_island_mode<Q: IslandEventQueue + ?Sized>(
    queue: &mut Q,
    repositories: &Repositories,
) {
    let topic = IslandEventTopic::SetIslandMode;

    let simulation = Arc::clone(&repositories.simulation);
    queue.subscribe(
        topic,
        handler(move |event| match event {
            IslandEvent::SetIslandMode { mode } => Ok(simulation.set_mode(*mode)?),
            other => Err(unexpected(topic, other)),
        }),
    );

    let per_mode =
        SetAgentConfigurationPerIslandMode::new(Arc::clone(&repositories.agent_configuration));
    queue.subscribe(
        topic,
        handler(move |event| match event {
            IslandEvent::SetIslandMode { mode } => Ok(per_mode.apply(*mode)?),
            other => Err(unexpected(topic, other)),
        }),
    );
}

fn subscribe_terminate_agents<Q: IslandEventQueue + ?Sized>(
    queue: &mut Q,
    agent_signals: &Arc<AgentSignalsService>,
) {
    let topic = IslandEventTopic::TerminateAgents;
    let signals = Arc::clone(agent_signals);
    queue.subscribe(
        topic,
        handler(move |event| match event {
            IslandEvent::TerminateAgents { timestamp } => {
                Ok(signals.on_terminate_agents_signal(*timestamp)?)
            }
            other => Err(unexpected(topic, other)),
        }),
    );
}
