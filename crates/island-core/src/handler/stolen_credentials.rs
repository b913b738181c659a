use island_types::error::HandlerError;
use island_types::event::{AgentEvent, AgentEventKind, AgentEventPayload};
use tracing::debug;

use crate::repository::CredentialsRepository;

pub fn save_stolen_credentials(
    repository: &dyn CredentialsRepository,
    event: &AgentEvent,
) -> Result<(), HandlerError> {
    let AgentEventPayload::CredentialsStolen { stolen_credentials } = event.payload() else {
        return Err(HandlerError::UnexpectedEvent {
            expected: AgentEventKind::CredentialsStolen,
            actual: event.kind(),
        });
    };
    repository.save_stolen_credentials(stolen_credentials)?;
    debug!(
        agent_id = %event.source(),
        count = stolen_credentials.len(),
        "stolen credentials saved"
    );
    Ok(())
}
