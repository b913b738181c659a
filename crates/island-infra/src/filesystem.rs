//! Data directory resolution.

use std::path::PathBuf;

/// Resolve the Island data directory.
///
/// `ISLAND_DATA_DIR` wins, then `~/.island`, then `.island` in the current
/// directory.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ISLAND_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".island");
    }

    PathBuf::from(".island")
}
