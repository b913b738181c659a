//! In-memory repository implementations.
//!
//! Every repository lives for the lifetime of the process; nothing survives
//! a restart. All of them are safe to share across threads behind `Arc`.

pub mod agent;
pub mod agent_configuration;
pub mod agent_event;
pub mod agent_log;
pub mod credentials;
pub mod machine;
pub mod node;
pub mod simulation;

pub use agent::InMemoryAgentRepository;
pub use agent_configuration::InMemoryAgentConfigurationRepository;
pub use agent_event::InMemoryAgentEventRepository;
pub use agent_log::InMemoryAgentLogRepository;
pub use credentials::InMemoryCredentialsRepository;
pub use machine::InMemoryMachineRepository;
pub use node::InMemoryNodeRepository;
pub use simulation::InMemorySimulationRepository;
