//! Credential store abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use bazaar_core::result::AppResult;
use bazaar_entity::identity::IdentityProviderKind;
use bazaar_entity::user::{Credential, NewCredential};

/// Storage for credential records.
///
/// Writes must be visible to every read issued after the write returns.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a credential by principal id.
    async fn find(&self, id: &str) -> AppResult<Option<Credential>>;

    /// Find a credential by email, case-insensitively.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Credential>>;

    /// Find the credential linked to an external provider account.
    async fn find_by_provider(
        &self,
        provider: IdentityProviderKind,
        external_id: &str,
    ) -> AppResult<Option<Credential>>;

    /// Create a credential. Fails with a conflict on a duplicate email.
    async fn create(&self, data: NewCredential) -> AppResult<Credential>;

    /// Replace the password hash, set the watermark, and clear the
    /// forced-change flag. Callers go through
    /// [`PasswordChangeGuard`](crate::password::PasswordChangeGuard).
    async fn update_password(
        &self,
        id: &str,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Move the watermark without changing the password.
    async fn set_password_changed_at(&self, id: &str, changed_at: DateTime<Utc>)
    -> AppResult<()>;

    /// Set or clear the forced-password-change flag.
    async fn set_must_change_password(&self, id: &str, required: bool) -> AppResult<()>;

    /// Attach an external provider account to a credential.
    async fn link_provider(
        &self,
        id: &str,
        provider: IdentityProviderKind,
        external_id: &str,
    ) -> AppResult<Credential>;
}
