//! In-memory machine repository.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use island_core::repository::MachineRepository;
use island_types::error::RepositoryError;
use island_types::machine::{HardwareId, Machine, MachineId};

/// Machines keyed by id. Ids come from a counter that never goes back, so
/// ids are not reused after `reset`.
#[derive(Debug, Default)]
pub struct InMemoryMachineRepository {
    machines: DashMap<MachineId, Machine>,
    next_id: AtomicU32,
}

impl InMemoryMachineRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MachineRepository for InMemoryMachineRepository {
    fn get_new_id(&self) -> Result<MachineId, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if id == u32::MAX {
            return Err(RepositoryError::Storage("machine ids exhausted".to_string()));
        }
        Ok(MachineId(id))
    }

    fn upsert_machine(&self, machine: &Machine) -> Result<(), RepositoryError> {
        if let Some(hardware_id) = machine.hardware_id {
            let clash = self
                .machines
                .iter()
                .find(|entry| {
                    *entry.key() != machine.id() && entry.hardware_id == Some(hardware_id)
                })
                .map(|entry| *entry.key());
            if let Some(other) = clash {
                return Err(RepositoryError::Storage(format!(
                    "hardware id {hardware_id} already belongs to machine {other}"
                )));
            }
        }
        self.machines.insert(machine.id(), machine.clone());
        Ok(())
    }

    fn get_machine_by_id(&self, id: MachineId) -> Result<Machine, RepositoryError> {
        self.machines
            .get(&id)
            .map(|m| m.clone())
            .ok_or_else(|| RepositoryError::UnknownRecord(format!("machine {id}")))
    }

    fn get_machine_by_hardware_id(
        &self,
        hardware_id: HardwareId,
    ) -> Result<Machine, RepositoryError> {
        self.machines
            .iter()
            .find(|entry| entry.hardware_id == Some(hardware_id))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                RepositoryError::UnknownRecord(format!("machine with hardware id {hardware_id}"))
            })
    }

    fn get_machines_by_ip(&self, ip: Ipv4Addr) -> Result<Vec<Machine>, RepositoryError> {
        let mut machines: Vec<Machine> = self
            .machines
            .iter()
            .filter(|entry| entry.has_ip(ip))
            .map(|entry| entry.value().clone())
            .collect();
        if machines.is_empty() {
            return Err(RepositoryError::UnknownRecord(format!("machine with ip {ip}")));
        }
        machines.sort_by_key(Machine::id);
        Ok(machines)
    }

    fn get_machines(&self) -> Result<Vec<Machine>, RepositoryError> {
        let mut machines: Vec<Machine> =
            self.machines.iter().map(|entry| entry.value().clone()).collect();
        machines.sort_by_key(Machine::id);
        Ok(machines)
    }

    fn reset(&self) -> Result<(), RepositoryError> {
        self.machines.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use island_types::network::NetworkInterface;

    use super::*;

    fn machine_with_ip(repo: &InMemoryMachineRepository, ip: &str) -> Machine {
        let interface: NetworkInterface = ip.parse().unwrap();
        Machine::new(repo.get_new_id().unwrap()).with_network_interfaces([interface])
    }

    #[test]
    fn test_ids_are_not_reused_after_reset() {
        let repo = InMemoryMachineRepository::new();
        assert_eq!(repo.get_new_id().unwrap(), MachineId(0));
        repo.reset().unwrap();
        assert_eq!(repo.get_new_id().unwrap(), MachineId(1));
    }

    #[test]
    fn test_lookup_by_ip_returns_all_matches_in_id_order() {
        let repo = InMemoryMachineRepository::new();
        let first = machine_with_ip(&repo, "10.0.0.5/24");
        let second = machine_with_ip(&repo, "10.0.0.5/16");
        repo.upsert_machine(&second).unwrap();
        repo.upsert_machine(&first).unwrap();

        let found = repo.get_machines_by_ip("10.0.0.5".parse().unwrap()).unwrap();

        assert_eq!(found, vec![first, second]);
    }

    #[test]
    fn test_missing_records_are_unknown() {
        let repo = InMemoryMachineRepository::new();
        assert!(repo.get_machine_by_id(MachineId(3)).unwrap_err().is_unknown_record());
        assert!(
            repo.get_machines_by_ip("10.0.0.1".parse().unwrap())
                .unwrap_err()
                .is_unknown_record()
        );
        assert!(
            repo.get_machine_by_hardware_id(HardwareId::new(1).unwrap())
                .unwrap_err()
                .is_unknown_record()
        );
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let repo = InMemoryMachineRepository::new();
        let mut machine = machine_with_ip(&repo, "10.0.0.5/24");
        repo.upsert_machine(&machine).unwrap();
        machine.hostname = "renamed".to_string();
        repo.upsert_machine(&machine).unwrap();

        assert_eq!(repo.get_machines().unwrap(), vec![machine]);
    }

    #[test]
    fn test_hardware_id_must_be_unique() {
        let repo = InMemoryMachineRepository::new();
        let hardware_id = HardwareId::new(8).unwrap();
        let first = Machine::new(repo.get_new_id().unwrap()).with_hardware_id(hardware_id);
        let second = Machine::new(repo.get_new_id().unwrap()).with_hardware_id(hardware_id);

        repo.upsert_machine(&first).unwrap();
        assert!(matches!(repo.upsert_machine(&second), Err(RepositoryError::Storage(_))));
        assert_eq!(repo.get_machine_by_hardware_id(hardware_id).unwrap(), first);
    }
}
