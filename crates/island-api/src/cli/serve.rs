//! `island serve`: agent requests as JSON lines on stdin.
//!
//! Each input line is one [`Request`]; each produces exactly one JSON
//! response line on stdout. The heartbeat check runs in the background for
//! as long as the command does.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use island_core::event::AgentEventQueue;
use island_core::island_event::IslandEventQueue;
use island_core::repository::{AgentConfigurationRepository, AgentLogRepository};
use island_types::agent::{AgentId, AgentRegistrationData};
use island_types::event::AgentEvent;
use island_types::island_event::{IslandEvent, IslandMode};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::status::{RequestCounts, print_summary};
use crate::state::AppState;

const HEARTBEAT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum Request {
    Register {
        registration: AgentRegistrationData,
    },
    Heartbeat {
        agent_id: AgentId,
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },
    Event {
        event: AgentEvent,
    },
    Log {
        agent_id: AgentId,
        log: String,
    },
    Signals {
        agent_id: AgentId,
    },
    Configuration,
    SetMode {
        mode: IslandMode,
    },
    Terminate,
    ResetAgentConfiguration,
    ClearSimulationData,
}

pub async fn serve(state: &AppState, json: bool) -> Result<()> {
    let mut heartbeat = state.heartbeat_caller();
    heartbeat.start()?;
    info!("accepting agent requests on stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut counts = RequestCounts::default();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let response = respond(state, &line, &mut counts);
                println!("{response}");
            }
        }
    }

    heartbeat.stop(Some(HEARTBEAT_STOP_TIMEOUT))?;
    print_summary(state, Some(&counts), json)
}

fn respond(state: &AppState, line: &str, counts: &mut RequestCounts) -> Value {
    let result = serde_json::from_str::<Request>(line)
        .map_err(|err| anyhow::anyhow!("invalid request: {err}"))
        .and_then(|request| handle_request(state, request));

    match result {
        Ok(response) => {
            counts.handled += 1;
            response
        }
        Err(err) => {
            counts.failed += 1;
            warn!(error = %format!("{err:#}"), "request failed");
            json!({ "ok": false, "error": format!("{err:#}") })
        }
    }
}

/// Apply one request to the Island and describe the outcome.
pub fn handle_request(state: &AppState, request: Request) -> Result<Value> {
    let response = match request {
        Request::Register { registration } => {
            let agent_id = registration.id;
            state
                .island_event_queue
                .publish(IslandEvent::AgentRegistered { registration })?;
            json!({ "ok": true, "agent_id": agent_id })
        }
        Request::Heartbeat { agent_id, timestamp } => {
            state
                .island_event_queue
                .publish(IslandEvent::AgentHeartbeat { agent_id, timestamp })?;
            json!({ "ok": true })
        }
        Request::Event { event } => {
            state.agent_event_queue.publish(&event)?;
            json!({ "ok": true, "kind": event.kind() })
        }
        Request::Log { agent_id, log } => {
            state.repositories.agent_logs.upsert_agent_log(agent_id, &log)?;
            json!({ "ok": true })
        }
        Request::Signals { agent_id } => {
            let signals = state.agent_signals.get_signals(agent_id)?;
            json!({ "ok": true, "signals": signals })
        }
        Request::Configuration => {
            let configuration = state.repositories.agent_configuration.get_configuration()?;
            json!({ "ok": true, "configuration": configuration })
        }
        Request::SetMode { mode } => {
            state.island_event_queue.publish(IslandEvent::SetIslandMode { mode })?;
            json!({ "ok": true, "mode": mode })
        }
        Request::Terminate => {
            let timestamp = Utc::now();
            state
                .island_event_queue
                .publish(IslandEvent::TerminateAgents { timestamp })?;
            json!({ "ok": true, "timestamp": timestamp })
        }
        Request::ResetAgentConfiguration => {
            state.island_event_queue.publish(IslandEvent::ResetAgentConfiguration)?;
            json!({ "ok": true })
        }
        Request::ClearSimulationData => {
            state.island_event_queue.publish(IslandEvent::ClearSimulationData)?;
            json!({ "ok": true })
        }
    };
    Ok(response)
}
