//! Island service configuration.
//!
//! `IslandConfig` represents the `config.toml` in the Island's data
//! directory. All fields have defaults, so an empty file is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::island_event::IslandMode;
use crate::machine::HardwareId;
use crate::network::NetworkInterface;

/// Top-level configuration for the Island service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IslandConfig {
    /// How often agents that stopped sending heartbeats are marked stopped.
    #[serde(default = "default_heartbeat_check_interval_secs")]
    pub heartbeat_check_interval_secs: u64,

    /// Silence after which a running agent is considered stopped.
    #[serde(default = "default_heartbeat_timeout_secs")]
    pub heartbeat_timeout_secs: u64,

    /// Bounded wait of each plugin queue receive.
    #[serde(default = "default_plugin_queue_timeout_ms")]
    pub plugin_queue_timeout_ms: u64,

    /// Mode applied at startup.
    #[serde(default)]
    pub island_mode: IslandMode,

    /// Identity of the machine running the Island.
    #[serde(default)]
    pub island_machine: IslandMachineConfig,
}

fn default_heartbeat_check_interval_secs() -> u64 {
    30
}

fn default_heartbeat_timeout_secs() -> u64 {
    60
}

fn default_plugin_queue_timeout_ms() -> u64 {
    2_000
}

impl IslandConfig {
    pub fn heartbeat_check_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_check_interval_secs)
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat_timeout_secs)
    }

    pub fn plugin_queue_timeout(&self) -> Duration {
        Duration::from_millis(self.plugin_queue_timeout_ms)
    }
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            heartbeat_check_interval_secs: default_heartbeat_check_interval_secs(),
            heartbeat_timeout_secs: default_heartbeat_timeout_secs(),
            plugin_queue_timeout_ms: default_plugin_queue_timeout_ms(),
            island_mode: IslandMode::default(),
            island_machine: IslandMachineConfig::default(),
        }
    }
}

/// Hardware id and interfaces recorded for the Island's own machine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IslandMachineConfig {
    #[serde(default)]
    pub hardware_id: Option<HardwareId>,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
    #[serde(default)]
    pub hostname: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = IslandConfig::default();
        assert_eq!(config.heartbeat_check_interval(), Duration::from_secs(30));
        assert_eq!(config.heartbeat_timeout(), Duration::from_secs(60));
        assert_eq!(config.plugin_queue_timeout(), Duration::from_secs(2));
        assert_eq!(config.island_mode, IslandMode::Unset);
        assert!(config.island_machine.network_interfaces.is_empty());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: IslandConfig = toml::from_str("").unwrap();
        assert_eq!(config.heartbeat_check_interval_secs, 30);
        assert_eq!(config.plugin_queue_timeout_ms, 2_000);
    }

    #[test]
    fn test_toml_with_values() {
        let toml_str = r#"
heartbeat_check_interval_secs = 5
island_mode = "ransomware"

[island_machine]
hardware_id = 1234
network_interfaces = ["10.0.0.1/24", "172.16.0.1/16"]
hostname = "island"
"#;
        let config: IslandConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.heartbeat_check_interval_secs, 5);
        assert_eq!(config.heartbeat_timeout_secs, 60);
        assert_eq!(config.island_mode, IslandMode::Ransomware);
        assert_eq!(config.island_machine.hardware_id.unwrap().get(), 1234);
        assert_eq!(config.island_machine.network_interfaces.len(), 2);
        assert_eq!(config.island_machine.hostname, "island");
    }
}
