//! Shared domain types for the Island.
//!
//! This crate contains the core domain types used across the Island service and
//! its agents: agent telemetry events, Island lifecycle topics, machines,
//! agents, credentials, the network topology model, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod agent;
pub mod agent_configuration;
pub mod config;
pub mod credentials;
pub mod error;
pub mod event;
pub mod island_event;
pub mod machine;
pub mod network;
pub mod node;
