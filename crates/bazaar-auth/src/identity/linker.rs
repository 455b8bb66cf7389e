//! Links an external profile to a local credential.

use std::sync::Arc;

use tracing::info;

use bazaar_core::result::AppResult;
use bazaar_entity::identity::ExternalProfile;
use bazaar_entity::user::{Credential, NewCredential, UserRole};

use crate::credential::CredentialStore;

/// Domain used for generated placeholder emails.
const PLACEHOLDER_EMAIL_DOMAIN: &str = "users.noreply.bazaar";

/// Resolves an [`ExternalProfile`] to a credential: by external id, else by
/// email (then linked), else a new credential.
#[derive(Debug, Clone)]
pub struct IdentityLinker {
    credentials: Arc<dyn CredentialStore>,
}

impl IdentityLinker {
    /// Creates a linker over the credential store.
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    /// Placeholder email for providers that do not share one.
    pub fn placeholder_email(profile: &ExternalProfile) -> String {
        format!(
            "{}_{}@{PLACEHOLDER_EMAIL_DOMAIN}",
            profile.provider, profile.external_id
        )
    }

    /// Finds or creates the credential for the profile.
    pub async fn link(&self, profile: &ExternalProfile) -> AppResult<Credential> {
        if let Some(existing) = self
            .credentials
            .find_by_provider(profile.provider, &profile.external_id)
            .await?
        {
            return Ok(existing);
        }

        if let Some(email) = profile.email.as_deref() {
            if let Some(existing) = self.credentials.find_by_email(email).await? {
                info!(
                    subject = %existing.id,
                    provider = %profile.provider,
                    "Linking identity provider to existing account"
                );
                return self
                    .credentials
                    .link_provider(&existing.id, profile.provider, &profile.external_id)
                    .await;
            }
        }

        let email = profile
            .email
            .clone()
            .unwrap_or_else(|| Self::placeholder_email(profile));
        let created = self
            .credentials
            .create(NewCredential {
                email,
                password_hash: None,
                role: UserRole::User,
            })
            .await?;
        info!(
            subject = %created.id,
            provider = %profile.provider,
            "Created account from identity provider"
        );
        self.credentials
            .link_provider(&created.id, profile.provider, &profile.external_id)
            .await
    }
}
