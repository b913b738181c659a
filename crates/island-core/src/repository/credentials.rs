//! Credentials repository trait definition.

use island_types::credentials::Credentials;
use island_types::error::RepositoryError;

/// Repository for credentials, split into the ones an operator configured
/// and the ones agents stole during the simulation.
pub trait CredentialsRepository: Send + Sync {
    fn get_configured_credentials(&self) -> Result<Vec<Credentials>, RepositoryError>;

    fn get_stolen_credentials(&self) -> Result<Vec<Credentials>, RepositoryError>;

    /// Configured followed by stolen credentials, without duplicates.
    fn get_all_credentials(&self) -> Result<Vec<Credentials>, RepositoryError>;

    fn save_configured_credentials(&self, credentials: &[Credentials])
    -> Result<(), RepositoryError>;

    fn save_stolen_credentials(&self, credentials: &[Credentials]) -> Result<(), RepositoryError>;

    fn remove_configured_credentials(&self) -> Result<(), RepositoryError>;

    fn remove_stolen_credentials(&self) -> Result<(), RepositoryError>;

    fn remove_all_credentials(&self) -> Result<(), RepositoryError> {
        self.remove_configured_credentials()?;
        self.remove_stolen_credentials()
    }

    fn reset(&self) -> Result<(), RepositoryError> {
        self.remove_all_credentials()
    }
}
