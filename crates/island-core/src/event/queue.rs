//! The agent event queue trait and subscriber type.

use std::sync::Arc;

use island_types::agent::AgentId;
use island_types::error::HandlerError;
use island_types::event::{AgentEvent, AgentEventKind};
use thiserror::Error;

/// What every subscriber and topic handler returns.
pub type HandlerResult = Result<(), HandlerError>;

/// A callable bound to agent events.
///
/// Subscribers are shared (`Arc`) because one callable may be registered
/// under several kinds or tags.
pub type AgentEventSubscriber = Arc<dyn Fn(&AgentEvent) -> HandlerResult + Send + Sync>;

/// Wrap a closure as an [`AgentEventSubscriber`].
pub fn subscriber<F>(f: F) -> AgentEventSubscriber
where
    F: Fn(&AgentEvent) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A subscriber failed while an event was being published.
///
/// Subscribers after the failing one did not run.
#[derive(Debug, Error)]
#[error("subscriber failed on {kind} event from agent {agent_id}: {error}")]
pub struct PublishError {
    pub kind: AgentEventKind,
    pub agent_id: AgentId,
    #[source]
    pub error: HandlerError,
}

/// Agent event bus.
///
/// Subscription takes `&mut self`: subscribers are registered while the
/// queue is still exclusively owned, before it is shared with publishing
/// threads. `publish` takes `&self`; implementations decide whether
/// concurrent publication is serialized (see `LockingAgentEventQueue`).
pub trait AgentEventQueue: Send + Sync {
    /// Register a subscriber for every event.
    fn subscribe_all_events(&mut self, subscriber: AgentEventSubscriber);

    /// Register a subscriber for events of one kind.
    fn subscribe_type(&mut self, kind: AgentEventKind, subscriber: AgentEventSubscriber);

    /// Register a subscriber for events carrying `tag`.
    fn subscribe_tag(&mut self, tag: &str, subscriber: AgentEventSubscriber);

    /// Deliver `event` to every matching subscriber before returning.
    ///
    /// A subscriber registered through several matching routes runs once
    /// per route. The first subscriber failure aborts delivery and is
    /// returned.
    fn publish(&self, event: &AgentEvent) -> Result<(), PublishError>;
}
