//! Subscribers on the agent event bus that keep Island repositories in
//! step with what agents report.

pub mod exploitation;
pub mod machine_info;
pub mod save_event;
pub mod scan;
pub mod shutdown;
pub mod stolen_credentials;

use std::net::Ipv4Addr;

use island_types::error::RepositoryError;
use island_types::machine::Machine;
use island_types::network::NetworkInterface;
use tracing::{debug, warn};

use crate::repository::MachineRepository;

pub use exploitation::UpdateNodesOnExploitation;
pub use machine_info::{update_machine_hostname, update_machine_os};
pub use save_event::save_event_to_event_repository;
pub use scan::ScanEventHandler;
pub use shutdown::update_agent_shutdown_status;
pub use stolen_credentials::save_stolen_credentials;

/// The machine with an interface on `ip`, created as a bare /32 host when
/// none is known yet.
pub(crate) fn get_or_create_target_machine(
    machine_repository: &dyn MachineRepository,
    ip: Ipv4Addr,
) -> Result<Machine, RepositoryError> {
    match machine_repository.get_machines_by_ip(ip) {
        Ok(machines) => {
            if machines.len() > 1 {
                warn!(ip = %ip, count = machines.len(), "several machines share target address");
            }
            match machines.into_iter().next() {
                Some(machine) => Ok(machine),
                None => create_target_machine(machine_repository, ip),
            }
        }
        Err(err) if err.is_unknown_record() => create_target_machine(machine_repository, ip),
        Err(err) => Err(err),
    }
}

fn create_target_machine(
    machine_repository: &dyn MachineRepository,
    ip: Ipv4Addr,
) -> Result<Machine, RepositoryError> {
    let machine = Machine::new(machine_repository.get_new_id()?)
        .with_network_interfaces([NetworkInterface::host(ip)]);
    machine_repository.upsert_machine(&machine)?;
    debug!(machine_id = %machine.id(), ip = %ip, "created machine for target");
    Ok(machine)
}
