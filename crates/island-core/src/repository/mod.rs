//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (island-infra) implements. All methods are blocking and take `&self`;
//! implementations synchronize internally so handlers can share them behind
//! `Arc<dyn ...>`.
//!
//! Lookups that find nothing return `RepositoryError::UnknownRecord`, never
//! an empty `Ok`, unless the method returns a collection.

pub mod agent;
pub mod agent_configuration;
pub mod agent_event;
pub mod agent_log;
pub mod credentials;
pub mod machine;
pub mod node;
pub mod simulation;

pub use agent::AgentRepository;
pub use agent_configuration::AgentConfigurationRepository;
pub use agent_event::AgentEventRepository;
pub use agent_log::AgentLogRepository;
pub use credentials::CredentialsRepository;
pub use machine::MachineRepository;
pub use node::NodeRepository;
pub use simulation::SimulationRepository;
