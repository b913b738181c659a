use island_types::error::HandlerError;
use island_types::event::AgentEvent;

use crate::repository::AgentEventRepository;

/// Store every event, whatever its kind.
pub fn save_event_to_event_repository(
    repository: &dyn AgentEventRepository,
    event: &AgentEvent,
) -> Result<(), HandlerError> {
    repository.save_event(event)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use island_types::agent::AgentId;
    use island_types::event::AgentEventPayload;

    use super::*;
    use crate::testing::FakeEventRepository;

    #[test]
    fn test_event_is_saved() {
        let repository = FakeEventRepository::default();
        let event = AgentEvent::new(AgentId::new(), AgentEventPayload::AgentShutdown);

        save_event_to_event_repository(&repository, &event).unwrap();

        assert_eq!(repository.get_events().unwrap(), vec![event]);
    }
}
