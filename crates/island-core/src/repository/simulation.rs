//! Simulation repository trait definition.

use chrono::{DateTime, Utc};
use island_types::error::RepositoryError;
use island_types::island_event::IslandMode;

/// Simulation-wide settings: the Island mode and the last terminate signal.
pub trait SimulationRepository: Send + Sync {
    fn get_mode(&self) -> Result<IslandMode, RepositoryError>;

    fn set_mode(&self, mode: IslandMode) -> Result<(), RepositoryError>;

    fn get_terminate_signal_time(&self) -> Result<Option<DateTime<Utc>>, RepositoryError>;

    fn set_terminate_signal_time(&self, time: DateTime<Utc>) -> Result<(), RepositoryError>;
}
