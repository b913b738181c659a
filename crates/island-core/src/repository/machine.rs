//! Machine repository trait definition.

use std::net::Ipv4Addr;

use island_types::error::RepositoryError;
use island_types::machine::{HardwareId, Machine, MachineId};

/// Repository trait for machine persistence.
///
/// Implementations live in island-infra (e.g., InMemoryMachineRepository).
pub trait MachineRepository: Send + Sync {
    /// Allocate a machine id that no stored or previously allocated machine
    /// uses.
    fn get_new_id(&self) -> Result<MachineId, RepositoryError>;

    /// Insert the machine, or replace the stored machine with the same id.
    fn upsert_machine(&self, machine: &Machine) -> Result<(), RepositoryError>;

    fn get_machine_by_id(&self, id: MachineId) -> Result<Machine, RepositoryError>;

    fn get_machine_by_hardware_id(&self, hardware_id: HardwareId)
    -> Result<Machine, RepositoryError>;

    /// All machines with an interface carrying `ip`, lowest id first.
    ///
    /// Returns `UnknownRecord` when no machine matches.
    fn get_machines_by_ip(&self, ip: Ipv4Addr) -> Result<Vec<Machine>, RepositoryError>;

    fn get_machines(&self) -> Result<Vec<Machine>, RepositoryError>;

    /// Remove every machine. Ids already handed out are not reused.
    fn reset(&self) -> Result<(), RepositoryError>;
}
