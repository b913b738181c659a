use island_types::error::{HandlerError, RepositoryError};
use island_types::event::AgentEvent;
use tracing::{error, info};

use crate::repository::AgentRepository;

/// Record the event's timestamp as the source agent's stop time.
///
/// A storage failure is logged and swallowed: the heartbeat check will set
/// the stop time later. An unknown agent is an error.
pub fn update_agent_shutdown_status(
    repository: &dyn AgentRepository,
    event: &AgentEvent,
) -> Result<(), HandlerError> {
    let mut agent = repository.get_agent_by_id(event.source())?;
    agent.stop_time = Some(event.timestamp());

    match repository.upsert_agent(&agent) {
        Ok(()) => {
            info!(agent_id = %agent.id, stop_time = %event.timestamp(), "agent shut down");
            Ok(())
        }
        Err(RepositoryError::Storage(reason)) => {
            error!(agent_id = %agent.id, reason = %reason, "failed to store agent stop time");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use island_types::agent::AgentId;
    use island_types::event::AgentEventPayload;
    use island_types::machine::MachineId;

    use super::*;
    use crate::testing::{FakeAgentRepository, agent_on, time};

    fn shutdown_of(agent_id: AgentId) -> AgentEvent {
        AgentEvent::new(agent_id, AgentEventPayload::AgentShutdown).with_timestamp(time(30))
    }

    #[test]
    fn test_stop_time_is_event_timestamp() {
        let repository = FakeAgentRepository::default();
        let agent = agent_on(MachineId(1));
        repository.insert_agent(&agent).unwrap();

        update_agent_shutdown_status(&repository, &shutdown_of(agent.id)).unwrap();

        assert_eq!(repository.get_agent_by_id(agent.id).unwrap().stop_time, Some(time(30)));
    }

    #[test]
    fn test_storage_error_is_swallowed() {
        let repository = FakeAgentRepository::default();
        let agent = agent_on(MachineId(1));
        repository.insert_agent(&agent).unwrap();
        *repository.upsert_error.lock() = Some(RepositoryError::Storage("disk full".into()));

        assert!(update_agent_shutdown_status(&repository, &shutdown_of(agent.id)).is_ok());
    }

    #[test]
    fn test_unknown_agent_propagates() {
        let repository = FakeAgentRepository::default();

        let err =
            update_agent_shutdown_status(&repository, &shutdown_of(AgentId::new())).unwrap_err();

        assert!(matches!(err, HandlerError::Repository(RepositoryError::UnknownRecord(_))));
    }

    #[test]
    fn test_other_upsert_errors_propagate() {
        let repository = FakeAgentRepository::default();
        let agent = agent_on(MachineId(1));
        repository.insert_agent(&agent).unwrap();
        *repository.upsert_error.lock() = Some(RepositoryError::UnknownRecord("gone".into()));

        assert!(update_agent_shutdown_status(&repository, &shutdown_of(agent.id)).is_err());
    }
}
