//! Island configuration loader.
//!
//! Reads `config.toml` from the data directory (`~/.island/` in production)
//! and deserializes it into [`IslandConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::Path;

use island_types::config::IslandConfig;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Load the Island configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`IslandConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub fn load_island_config(data_dir: &Path) -> IslandConfig {
    let config_path = data_dir.join(CONFIG_FILE_NAME);

    let content = match std::fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return IslandConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return IslandConfig::default();
        }
    };

    match toml::from_str::<IslandConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", config_path.display());
            IslandConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use island_types::island_event::IslandMode;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_island_config(tmp.path());
        assert_eq!(config.heartbeat_check_interval(), Duration::from_secs(30));
        assert_eq!(config.plugin_queue_timeout(), Duration::from_secs(2));
        assert_eq!(config.island_mode, IslandMode::Unset);
    }

    #[test]
    fn test_valid_toml_is_parsed() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
heartbeat_timeout_secs = 120
island_mode = "ransomware"

[island_machine]
hardware_id = 99
network_interfaces = ["10.0.0.1/24"]
hostname = "island"
"#,
        )
        .unwrap();

        let config = load_island_config(tmp.path());
        assert_eq!(config.heartbeat_timeout(), Duration::from_secs(120));
        assert_eq!(config.heartbeat_check_interval_secs, 30);
        assert_eq!(config.island_mode, IslandMode::Ransomware);
        assert_eq!(config.island_machine.hardware_id.map(|id| id.get()), Some(99));
        assert_eq!(config.island_machine.network_interfaces.len(), 1);
    }

    #[test]
    fn test_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "this is not { valid toml !!!").unwrap();

        let config = load_island_config(tmp.path());
        assert_eq!(config.heartbeat_timeout_secs, 60);
    }
}
