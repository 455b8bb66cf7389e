//! Credential record owned by the identity subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::UserRole;

/// Per-principal credential: password hash, role, and the
/// `password_changed_at` watermark that invalidates older tokens.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Credential {
    /// Principal identifier (the `id` claim of issued tokens).
    pub id: String,
    /// Login email, unique case-insensitively.
    pub email: String,
    /// Argon2id password hash. `None` for accounts created through an
    /// external identity provider that never set a password.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Assigned role.
    pub role: UserRole,
    /// Tokens whose `iat` second starts before this instant are rejected.
    pub password_changed_at: Option<DateTime<Utc>>,
    /// Set by an administrator to require a real password change.
    pub must_change_password: bool,
    /// Linked Google account id.
    pub google_id: Option<String>,
    /// Linked Facebook account id.
    pub facebook_id: Option<String>,
    /// Linked Apple account id.
    pub apple_id: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Whether a token issued at `issued_at` (unix seconds) predates the
    /// watermark. The watermark keeps its sub-second part, so a token
    /// minted earlier in the same second is still rejected. An absent
    /// watermark never rejects.
    pub fn changed_password_after(&self, issued_at: i64) -> bool {
        let Some(changed_at) = self.password_changed_at else {
            return false;
        };
        match DateTime::from_timestamp(issued_at, 0) {
            Some(issued) => issued < changed_at,
            None => true,
        }
    }
}

/// Data required to create a new credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCredential {
    /// Login email.
    pub email: String,
    /// Pre-hashed password, if any.
    pub password_hash: Option<String>,
    /// Assigned role.
    pub role: UserRole,
}
