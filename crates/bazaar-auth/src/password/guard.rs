//! Moves the `password_changed_at` watermark on password mutation.

use chrono::{DateTime, Utc};
use tracing::info;

use bazaar_core::config::AuthConfig;
use bazaar_core::result::AppResult;

use crate::credential::CredentialStore;

/// Applies the watermark rule on every password write.
///
/// The watermark is set slightly in the past so that tokens minted right
/// after the change, within the same second, are not rejected.
#[derive(Debug, Clone, Copy)]
pub struct PasswordChangeGuard {
    epsilon: chrono::Duration,
}

impl PasswordChangeGuard {
    /// Creates a guard with an explicit epsilon.
    pub fn new(epsilon: chrono::Duration) -> Self {
        Self { epsilon }
    }

    /// Creates a guard from auth configuration.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(chrono::Duration::milliseconds(
            config.password_change_epsilon_ms as i64,
        ))
    }

    /// Watermark for a password change happening at `now`.
    pub fn watermark(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.epsilon
    }

    /// Stores a new password hash together with the adjusted watermark.
    pub async fn set_password(
        &self,
        store: &dyn CredentialStore,
        id: &str,
        password_hash: &str,
    ) -> AppResult<DateTime<Utc>> {
        let changed_at = self.watermark(Utc::now());
        store.update_password(id, password_hash, changed_at).await?;
        info!(subject = %id, changed_at = %changed_at, "Password changed, watermark moved");
        Ok(changed_at)
    }
}

impl Default for PasswordChangeGuard {
    fn default() -> Self {
        Self::new(chrono::Duration::seconds(1))
    }
}
