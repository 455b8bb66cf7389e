//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Minimum accepted length of the HMAC signing secret.
const MIN_SECRET_LENGTH: usize = 32;

/// Token signing and credential configuration.
///
/// Injected into the token issuer/verifier at construction so that tests
/// and secret rotation never depend on process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    pub jwt_secret: String,
    /// Previously used secrets, still accepted for verification only.
    #[serde(default)]
    pub jwt_previous_secrets: Vec<String>,
    /// Optional `iss` claim stamped on and required from every token.
    #[serde(default)]
    pub jwt_issuer: Option<String>,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub jwt_access_ttl_minutes: u64,
    /// Refresh token TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub jwt_refresh_ttl_hours: u64,
    /// How far `password_changed_at` is moved into the past on a password
    /// change, in milliseconds.
    #[serde(default = "default_epsilon")]
    pub password_change_epsilon_ms: u64,
}

impl AuthConfig {
    /// Creates a configuration with default TTLs for the given secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            jwt_previous_secrets: Vec::new(),
            jwt_issuer: None,
            jwt_access_ttl_minutes: default_access_ttl(),
            jwt_refresh_ttl_hours: default_refresh_ttl(),
            password_change_epsilon_ms: default_epsilon(),
        }
    }

    /// Rejects configurations that would make tokens forgeable or unusable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::configuration(format!(
                "auth.jwt_secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }
        if self.jwt_access_ttl_minutes == 0 || self.jwt_refresh_ttl_hours == 0 {
            return Err(AppError::configuration("token TTLs must be greater than zero"));
        }
        Ok(())
    }
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    168
}

fn default_epsilon() -> u64 {
    1000
}
