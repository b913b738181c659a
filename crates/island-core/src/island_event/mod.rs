//! Island topic bus.
//!
//! Island-internal notifications (an agent registered, the operator cleared
//! the simulation, ...) are published on a closed set of topics. Every
//! handler subscribed to a topic runs, in subscription order, even when an
//! earlier one fails.

pub mod queue;

pub use queue::{
    InMemoryIslandEventQueue, IslandEventError, IslandEventHandler, IslandEventQueue, handler,
};
