use chrono::{DateTime, Utc};
use island_core::repository::SimulationRepository;
use island_types::error::RepositoryError;
use island_types::island_event::IslandMode;
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct Simulation {
    mode: IslandMode,
    terminate_signal_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct InMemorySimulationRepository {
    simulation: RwLock<Simulation>,
}

impl InMemorySimulationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimulationRepository for InMemorySimulationRepository {
    fn get_mode(&self) -> Result<IslandMode, RepositoryError> {
        Ok(self.simulation.read().mode)
    }

    fn set_mode(&self, mode: IslandMode) -> Result<(), RepositoryError> {
        self.simulation.write().mode = mode;
        Ok(())
    }

    fn get_terminate_signal_time(&self) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        Ok(self.simulation.read().terminate_signal_time)
    }

    fn set_terminate_signal_time(&self, time: DateTime<Utc>) -> Result<(), RepositoryError> {
        self.simulation.write().terminate_signal_time = Some(time);
        Ok(())
    }
}
