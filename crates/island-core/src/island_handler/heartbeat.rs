//! Infers agent stop times from missing heartbeats.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use island_types::agent::{Agent, AgentId};
use island_types::error::HandlerError;
use island_types::island_event::{IslandEvent, IslandEventTopic};
use tracing::{debug, info};

use crate::repository::AgentRepository;

/// Tracks the latest heartbeat of every agent and marks agents stopped once
/// they have been silent for longer than the timeout.
///
/// Agents that crash never send a shutdown event, so this is the only way
/// their `stop_time` gets set.
pub struct AgentHeartbeatHandler {
    agent_repository: Arc<dyn AgentRepository>,
    heartbeat_timeout: Duration,
    latest_heartbeats: DashMap<AgentId, DateTime<Utc>>,
}

impl AgentHeartbeatHandler {
    pub fn new(agent_repository: Arc<dyn AgentRepository>, heartbeat_timeout: Duration) -> Self {
        Self {
            agent_repository,
            heartbeat_timeout,
            latest_heartbeats: DashMap::new(),
        }
    }

    pub fn handle_event(&self, event: &IslandEvent) -> Result<(), HandlerError> {
        match event {
            IslandEvent::AgentHeartbeat {
                agent_id,
                timestamp,
            } => {
                self.update_agent_last_heartbeat(*agent_id, *timestamp);
                Ok(())
            }
            other => Err(HandlerError::UnexpectedTopic {
                expected: IslandEventTopic::AgentHeartbeat,
                actual: other.topic(),
            }),
        }
    }

    /// Record a heartbeat. Out-of-order heartbeats never move the latest
    /// time backwards.
    pub fn update_agent_last_heartbeat(&self, agent_id: AgentId, timestamp: DateTime<Utc>) {
        self.latest_heartbeats
            .entry(agent_id)
            .and_modify(|latest| {
                if timestamp > *latest {
                    *latest = timestamp;
                }
            })
            .or_insert(timestamp);
    }

    pub fn latest_heartbeat(&self, agent_id: AgentId) -> Option<DateTime<Utc>> {
        self.latest_heartbeats.get(&agent_id).map(|t| *t)
    }

    pub fn update_agents_stop_time_from_heartbeat(&self) -> Result<(), HandlerError> {
        self.update_agents_stop_time_at(Utc::now())
    }

    /// Mark every running agent whose last sign of life is older than the
    /// timeout as stopped at that last sign of life.
    pub fn update_agents_stop_time_at(&self, now: DateTime<Utc>) -> Result<(), HandlerError> {
        for mut agent in self.agent_repository.get_running_agents()? {
            let last_seen = self.last_seen(&agent);
            let silent_too_long = now
                .signed_duration_since(last_seen)
                .to_std()
                .is_ok_and(|silence| silence > self.heartbeat_timeout);
            if !silent_too_long {
                continue;
            }

            agent.stop_time = Some(last_seen);
            self.agent_repository.upsert_agent(&agent)?;
            self.latest_heartbeats.remove(&agent.id);
            info!(agent_id = %agent.id, stop_time = %last_seen, "agent stopped sending heartbeats");
        }
        debug!(tracked = self.latest_heartbeats.len(), "heartbeat check complete");
        Ok(())
    }

    /// Forget every recorded heartbeat.
    pub fn reset(&self) {
        self.latest_heartbeats.clear();
    }

    fn last_seen(&self, agent: &Agent) -> DateTime<Utc> {
        self.latest_heartbeat(agent.id).unwrap_or(agent.start_time)
    }
}
