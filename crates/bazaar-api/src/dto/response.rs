//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_auth::TokenPair;
use bazaar_entity::user::{Credential, UserRole};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always `true`.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Account summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// Principal id.
    pub id: String,
    /// Email.
    pub email: String,
    /// Role.
    pub role: UserRole,
    /// Whether a password change has been forced.
    pub must_change_password: bool,
    /// Created at.
    pub created_at: DateTime<Utc>,
}

impl From<Credential> for UserResponse {
    fn from(c: Credential) -> Self {
        Self {
            id: c.id,
            email: c.email,
            role: c.role,
            must_change_password: c.must_change_password,
            created_at: c.created_at,
        }
    }
}

/// Token pair with the account it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Access and refresh tokens.
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// The signed-in account.
    pub user: UserResponse,
}

/// A new access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    /// Access token.
    pub access_token: String,
    /// Access token expiration.
    pub access_expires_at: DateTime<Utc>,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of a bulk revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkResponse {
    /// The affected account.
    pub user_id: String,
    /// Tokens issued before this instant are rejected.
    pub password_changed_at: DateTime<Utc>,
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` when every configured backend answers.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Cache backend reachability.
    pub cache: bool,
    /// Database reachability, `None` when no database is configured.
    pub database: Option<bool>,
}
