//! In-process agent event bus and its cross-process feed.
//!
//! Agents (and plugins running in child processes) report what they did as
//! `AgentEvent`s. Subscribers register for every event, for one event kind,
//! or for one tag; `publish` runs every matching subscriber synchronously on
//! the publishing thread.

pub mod forwarder;
pub mod in_memory;
pub mod locking;
pub mod queue;

pub use forwarder::{
    ForwarderError, PluginEventForwarder, PluginEventSource, QUEUE_EVENT_TIMEOUT, QueueError,
};
pub use in_memory::InMemoryAgentEventQueue;
pub use locking::LockingAgentEventQueue;
pub use queue::{AgentEventQueue, AgentEventSubscriber, HandlerResult, PublishError, subscriber};
