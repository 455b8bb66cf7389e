//! Negative-list entry for an explicitly invalidated token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kind::TokenKind;

/// A revoked token. The entry expires together with the token it revokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RevocationEntry {
    /// SHA-256 digest (hex) of the revoked token value.
    pub token: String,
    /// Subject the token was issued to.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Access or refresh.
    #[serde(rename = "type")]
    #[sqlx(rename = "token_type")]
    pub kind: TokenKind,
    /// The token's own expiry; the entry is irrelevant afterwards.
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

impl RevocationEntry {
    /// Whether the entry has outlived its token and may be pruned.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Remaining lifetime, zero once expired.
    pub fn remaining(&self) -> std::time::Duration {
        (self.expires_at - Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_shape() {
        let entry = RevocationEntry {
            token: "abc".to_string(),
            user_id: "u1".to_string(),
            kind: TokenKind::Refresh,
            expires_at: Utc::now(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["token"], "abc");
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["type"], "refresh");
        assert!(json.get("expiresAt").is_some());
    }

    #[test]
    fn test_expired_entry_has_no_remaining_lifetime() {
        let entry = RevocationEntry {
            token: "abc".to_string(),
            user_id: "u1".to_string(),
            kind: TokenKind::Access,
            expires_at: Utc::now() - chrono::Duration::seconds(5),
        };
        assert!(entry.is_expired());
        assert_eq!(entry.remaining(), std::time::Duration::ZERO);
    }
}
