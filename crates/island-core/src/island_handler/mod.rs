//! Handlers subscribed to Island topics.

pub mod heartbeat;
pub mod island_mode;
pub mod registration;
pub mod reset;

pub use heartbeat::AgentHeartbeatHandler;
pub use island_mode::SetAgentConfigurationPerIslandMode;
pub use registration::HandleAgentRegistration;
pub use reset::{ResetMachineRepository, reset_agent_configuration};
