//! Services the request layer calls directly.

pub mod agent_signals;

pub use agent_signals::AgentSignalsService;
