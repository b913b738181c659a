//! Configuration handed to agents when they start.
//!
//! Only the settings the Island itself adjusts are modelled here; the full
//! plugin option schema belongs to the plugin distribution layer.

use serde::{Deserialize, Serialize};

/// Settings agents pull from the Island.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfiguration {
    /// Seconds an agent keeps its tunnel open for children before exiting.
    #[serde(default = "default_keep_tunnel_open_time")]
    pub keep_tunnel_open_time: f64,

    /// Maximum propagation depth from the first agent.
    #[serde(default = "default_maximum_depth")]
    pub maximum_depth: u32,

    /// Exploiter plugins agents may run.
    #[serde(default)]
    pub exploiters: Vec<String>,

    /// Whether the ransomware simulation payload runs after propagation.
    #[serde(default)]
    pub ransomware_enabled: bool,
}

fn default_keep_tunnel_open_time() -> f64 {
    30.0
}

fn default_maximum_depth() -> u32 {
    2
}

impl Default for AgentConfiguration {
    fn default() -> Self {
        Self {
            keep_tunnel_open_time: default_keep_tunnel_open_time(),
            maximum_depth: default_maximum_depth(),
            exploiters: vec!["SSH".to_string(), "SMB".to_string(), "WMI".to_string()],
            ransomware_enabled: false,
        }
    }
}
