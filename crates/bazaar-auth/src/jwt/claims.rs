//! Claims embedded in every access and refresh token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_entity::token::TokenKind;

/// Token payload. Access and refresh tokens share this layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id.
    pub id: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
    /// Unique token id, so two tokens minted in the same second differ.
    pub jti: String,
    /// Access or refresh.
    #[serde(default)]
    pub typ: TokenKind,
    /// Issuer, when configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// A token is valid strictly before `exp`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Time left until `exp`, zero once expired.
    pub fn remaining(&self) -> chrono::Duration {
        let remaining = self.exp - Utc::now().timestamp();
        chrono::Duration::seconds(remaining.max(0))
    }
}
