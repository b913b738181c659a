//! Unsynchronized in-memory agent event queue.

use std::collections::HashMap;
use std::fmt;

use island_types::event::{AgentEvent, AgentEventKind};
use tracing::debug;

use super::queue::{AgentEventQueue, AgentEventSubscriber, PublishError};

/// Base implementation of [`AgentEventQueue`].
///
/// Dispatch order is fixed: subscribers to all events, then subscribers to
/// the event's kind, then subscribers to each of its tags in ascending tag
/// order. Within one route subscribers run in registration order.
///
/// Publishing takes no lock. Wrap the queue in a `LockingAgentEventQueue`
/// before publishing from more than one thread.
#[derive(Default)]
pub struct InMemoryAgentEventQueue {
    all: Vec<AgentEventSubscriber>,
    by_kind: HashMap<AgentEventKind, Vec<AgentEventSubscriber>>,
    by_tag: HashMap<String, Vec<AgentEventSubscriber>>,
}

impl InMemoryAgentEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registrations across all routes.
    pub fn subscription_count(&self) -> usize {
        self.all.len()
            + self.by_kind.values().map(Vec::len).sum::<usize>()
            + self.by_tag.values().map(Vec::len).sum::<usize>()
    }
}

impl AgentEventQueue for InMemoryAgentEventQueue {
    fn subscribe_all_events(&mut self, subscriber: AgentEventSubscriber) {
        self.all.push(subscriber);
    }

    fn subscribe_type(&mut self, kind: AgentEventKind, subscriber: AgentEventSubscriber) {
        self.by_kind.entry(kind).or_default().push(subscriber);
    }

    fn subscribe_tag(&mut self, tag: &str, subscriber: AgentEventSubscriber) {
        self.by_tag.entry(tag.to_string()).or_default().push(subscriber);
    }

    fn publish(&self, event: &AgentEvent) -> Result<(), PublishError> {
        let kind = event.kind();
        debug!(kind = %kind, agent_id = %event.source(), "publishing agent event");

        let by_kind = self.by_kind.get(&kind).into_iter().flatten();
        let by_tag = event
            .tags()
            .iter()
            .filter_map(|tag| self.by_tag.get(tag))
            .flatten();

        for subscriber in self.all.iter().chain(by_kind).chain(by_tag) {
            subscriber(event).map_err(|error| PublishError {
                kind,
                agent_id: event.source(),
                error,
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for InMemoryAgentEventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryAgentEventQueue")
            .field("all", &self.all.len())
            .field("kinds", &self.by_kind.len())
            .field("tags", &self.by_tag.len())
            .finish()
    }
}
