//! In-process credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_entity::identity::IdentityProviderKind;
use bazaar_entity::user::{Credential, NewCredential};

use super::store::CredentialStore;

/// Credential store backed by a concurrent map, for tests and
/// deployments without a database.
///
/// Emails are indexed in lowercase. Claiming the index entry and writing
/// the record happen under the same shard lock, so two concurrent
/// registrations of one email cannot both succeed.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    records: DashMap<String, Credential>,
    emails: DashMap<String, String>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn update<F>(&self, id: &str, apply: F) -> AppResult<Credential>
    where
        F: FnOnce(&mut Credential),
    {
        let mut entry = self
            .records
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Credential {id} not found")))?;
        apply(entry.value_mut());
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }
}

fn email_key(email: &str) -> String {
    email.to_ascii_lowercase()
}

fn linked_id(credential: &Credential, provider: IdentityProviderKind) -> Option<&str> {
    match provider {
        IdentityProviderKind::Google => credential.google_id.as_deref(),
        IdentityProviderKind::Facebook => credential.facebook_id.as_deref(),
        IdentityProviderKind::Apple => credential.apple_id.as_deref(),
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find(&self, id: &str) -> AppResult<Option<Credential>> {
        Ok(self.records.get(id).map(|entry| entry.clone()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Credential>> {
        let Some(id) = self.emails.get(&email_key(email)).map(|id| id.clone()) else {
            return Ok(None);
        };
        Ok(self.records.get(&id).map(|entry| entry.clone()))
    }

    async fn find_by_provider(
        &self,
        provider: IdentityProviderKind,
        external_id: &str,
    ) -> AppResult<Option<Credential>> {
        Ok(self
            .records
            .iter()
            .find(|entry| linked_id(entry.value(), provider) == Some(external_id))
            .map(|entry| entry.clone()))
    }

    async fn create(&self, data: NewCredential) -> AppResult<Credential> {
        let slot = match self.emails.entry(email_key(&data.email)) {
            Entry::Occupied(_) => {
                return Err(AppError::conflict(format!(
                    "An account with email '{}' already exists",
                    data.email
                )));
            }
            Entry::Vacant(slot) => slot,
        };

        let now = Utc::now();
        let credential = Credential {
            id: Uuid::new_v4().simple().to_string(),
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            password_changed_at: None,
            must_change_password: false,
            google_id: None,
            facebook_id: None,
            apple_id: None,
            created_at: now,
            updated_at: now,
        };
        self.records
            .insert(credential.id.clone(), credential.clone());
        slot.insert(credential.id.clone());
        Ok(credential)
    }

    async fn update_password(
        &self,
        id: &str,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.update(id, |c| {
            c.password_hash = Some(password_hash.to_string());
            c.password_changed_at = Some(changed_at);
            c.must_change_password = false;
        })?;
        Ok(())
    }

    async fn set_password_changed_at(
        &self,
        id: &str,
        changed_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.update(id, |c| c.password_changed_at = Some(changed_at))?;
        Ok(())
    }

    async fn set_must_change_password(&self, id: &str, required: bool) -> AppResult<()> {
        self.update(id, |c| c.must_change_password = required)?;
        Ok(())
    }

    async fn link_provider(
        &self,
        id: &str,
        provider: IdentityProviderKind,
        external_id: &str,
    ) -> AppResult<Credential> {
        let external_id = external_id.to_string();
        self.update(id, move |c| match provider {
            IdentityProviderKind::Google => c.google_id = Some(external_id),
            IdentityProviderKind::Facebook => c.facebook_id = Some(external_id),
            IdentityProviderKind::Apple => c.apple_id = Some(external_id),
        })
    }
}
