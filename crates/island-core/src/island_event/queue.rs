//! Island event queue trait and in-memory implementation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use island_types::error::HandlerError;
use island_types::island_event::{IslandEvent, IslandEventTopic};
use thiserror::Error;
use tracing::{debug, error};

use crate::event::HandlerResult;

/// A callable bound to one Island topic.
pub type IslandEventHandler = Arc<dyn Fn(&IslandEvent) -> HandlerResult + Send + Sync>;

/// Wrap a closure as an [`IslandEventHandler`].
pub fn handler<F>(f: F) -> IslandEventHandler
where
    F: Fn(&IslandEvent) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

#[derive(Debug, Error)]
pub enum IslandEventError {
    /// Some handlers failed. Handlers that succeeded are not rolled back.
    #[error(
        "{} of {total} handlers for {topic} failed, first: {}",
        .failures.len(),
        .failures.first().map(ToString::to_string).unwrap_or_default()
    )]
    HandlersFailed {
        topic: IslandEventTopic,
        total: usize,
        failures: Vec<HandlerError>,
    },
}

/// Topic-keyed publish/subscribe bus for Island events.
pub trait IslandEventQueue: Send + Sync {
    fn subscribe(&mut self, topic: IslandEventTopic, handler: IslandEventHandler);

    /// Run every handler subscribed to the event's topic.
    fn publish(&self, event: IslandEvent) -> Result<(), IslandEventError>;
}

#[derive(Default)]
pub struct InMemoryIslandEventQueue {
    handlers: HashMap<IslandEventTopic, Vec<IslandEventHandler>>,
}

impl InMemoryIslandEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler_count(&self, topic: IslandEventTopic) -> usize {
        self.handlers.get(&topic).map_or(0, Vec::len)
    }
}

impl IslandEventQueue for InMemoryIslandEventQueue {
    fn subscribe(&mut self, topic: IslandEventTopic, handler: IslandEventHandler) {
        self.handlers.entry(topic).or_default().push(handler);
    }

    fn publish(&self, event: IslandEvent) -> Result<(), IslandEventError> {
        let topic = event.topic();
        let handlers = self.handlers.get(&topic).map_or(&[][..], Vec::as_slice);
        debug!(topic = %topic, handlers = handlers.len(), "publishing island event");

        let failures: Vec<HandlerError> = handlers
            .iter()
            .filter_map(|handler| handler(&event).err())
            .inspect(|err| error!(topic = %topic, error = %err, "island event handler failed"))
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(IslandEventError::HandlersFailed {
                topic,
                total: handlers.len(),
                failures,
            })
        }
    }
}

impl fmt::Debug for InMemoryIslandEventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryIslandEventQueue")
            .field("topics", &self.handlers.len())
            .finish()
    }
}
