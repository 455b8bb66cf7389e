//! PostgreSQL-backed credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_database::repositories::CredentialRepository;
use bazaar_entity::identity::IdentityProviderKind;
use bazaar_entity::user::{Credential, NewCredential};

use super::store::CredentialStore;

/// Credential store over the `credentials` table.
#[derive(Debug, Clone)]
pub struct DatabaseCredentialStore {
    repo: CredentialRepository,
}

impl DatabaseCredentialStore {
    /// Wraps a credential repository.
    pub fn new(repo: CredentialRepository) -> Self {
        Self { repo }
    }
}

fn ensure_found(updated: bool, id: &str) -> AppResult<()> {
    if updated {
        Ok(())
    } else {
        Err(AppError::not_found(format!("Credential {id} not found")))
    }
}

#[async_trait]
impl CredentialStore for DatabaseCredentialStore {
    async fn find(&self, id: &str) -> AppResult<Option<Credential>> {
        self.repo.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Credential>> {
        self.repo.find_by_email(email).await
    }

    async fn find_by_provider(
        &self,
        provider: IdentityProviderKind,
        external_id: &str,
    ) -> AppResult<Option<Credential>> {
        self.repo.find_by_provider(provider, external_id).await
    }

    async fn create(&self, data: NewCredential) -> AppResult<Credential> {
        self.repo.create(&data).await
    }

    async fn update_password(
        &self,
        id: &str,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let updated = self
            .repo
            .update_password(id, password_hash, changed_at)
            .await?;
        ensure_found(updated, id)
    }

    async fn set_password_changed_at(
        &self,
        id: &str,
        changed_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let updated = self.repo.set_password_changed_at(id, changed_at).await?;
        ensure_found(updated, id)
    }

    async fn set_must_change_password(&self, id: &str, required: bool) -> AppResult<()> {
        let updated = self.repo.set_must_change_password(id, required).await?;
        ensure_found(updated, id)
    }

    async fn link_provider(
        &self,
        id: &str,
        provider: IdentityProviderKind,
        external_id: &str,
    ) -> AppResult<Credential> {
        self.repo.link_provider(id, provider, external_id).await
    }
}
