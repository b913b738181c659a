use island_core::repository::CredentialsRepository;
use island_types::credentials::Credentials;
use island_types::error::RepositoryError;
use parking_lot::RwLock;

/// Configured and stolen credentials, each kept in first-seen order without
/// duplicates.
#[derive(Debug, Default)]
pub struct InMemoryCredentialsRepository {
    configured: RwLock<Vec<Credentials>>,
    stolen: RwLock<Vec<Credentials>>,
}

impl InMemoryCredentialsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn extend_unique(target: &mut Vec<Credentials>, credentials: &[Credentials]) {
    for item in credentials {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

impl CredentialsRepository for InMemoryCredentialsRepository {
    fn get_configured_credentials(&self) -> Result<Vec<Credentials>, RepositoryError> {
        Ok(self.configured.read().clone())
    }

    fn get_stolen_credentials(&self) -> Result<Vec<Credentials>, RepositoryError> {
        Ok(self.stolen.read().clone())
    }

    fn get_all_credentials(&self) -> Result<Vec<Credentials>, RepositoryError> {
        let mut all = self.configured.read().clone();
        extend_unique(&mut all, &self.stolen.read());
        Ok(all)
    }

    fn save_configured_credentials(
        &self,
        credentials: &[Credentials],
    ) -> Result<(), RepositoryError> {
        extend_unique(&mut self.configured.write(), credentials);
        Ok(())
    }

    fn save_stolen_credentials(&self, credentials: &[Credentials]) -> Result<(), RepositoryError> {
        extend_unique(&mut self.stolen.write(), credentials);
        Ok(())
    }

    fn remove_configured_credentials(&self) -> Result<(), RepositoryError> {
        self.configured.write().clear();
        Ok(())
    }

    fn remove_stolen_credentials(&self) -> Result<(), RepositoryError> {
        self.stolen.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use island_types::credentials::{Identity, Secret};

    use super::*;

    fn user(name: &str) -> Credentials {
        Credentials::new(
            Some(Identity::Username(name.to_string())),
            Some(Secret::NtHash {
                nt_hash: "31d6cfe0d16ae931b73c59d7e0c089c0".to_string(),
            }),
        )
    }

    #[test]
    fn test_all_credentials_are_deduplicated() {
        let repo = InMemoryCredentialsRepository::new();
        repo.save_configured_credentials(&[user("admin")]).unwrap();
        repo.save_stolen_credentials(&[user("admin"), user("guest"), user("guest")]).unwrap();

        assert_eq!(repo.get_stolen_credentials().unwrap().len(), 2);
        assert_eq!(repo.get_all_credentials().unwrap(), vec![user("admin"), user("guest")]);
    }

    #[test]
    fn test_removing_stolen_keeps_configured() {
        let repo = InMemoryCredentialsRepository::new();
        repo.save_configured_credentials(&[user("admin")]).unwrap();
        repo.save_stolen_credentials(&[user("guest")]).unwrap();

        repo.remove_stolen_credentials().unwrap();
        assert_eq!(repo.get_all_credentials().unwrap(), vec![user("admin")]);

        repo.reset().unwrap();
        assert!(repo.get_all_credentials().unwrap().is_empty());
    }
}
