//! Revocation store abstraction.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use bazaar_core::result::AppResult;
use bazaar_entity::token::TokenKind;

/// Outcome of recording a revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationStatus {
    /// The token was not listed before.
    Revoked,
    /// The token was already listed; nothing changed.
    AlreadyRevoked,
}

/// Append-only set of revoked tokens whose entries expire with the token.
///
/// Entries are keyed by [`token_digest`] so raw bearer tokens are never
/// stored. A recorded entry must be visible to every `is_revoked` issued
/// after `record` returns.
#[async_trait]
pub trait RevocationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Lists a token for `ttl`, the token's remaining lifetime.
    async fn record(
        &self,
        token: &str,
        subject_id: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> AppResult<RevocationStatus>;

    /// Whether the token is currently listed.
    async fn is_revoked(&self, token: &str) -> AppResult<bool>;

    /// Number of unexpired entries for a subject.
    async fn count_for_subject(&self, subject_id: &str) -> AppResult<u64>;

    /// Drops entries whose token has expired. Returns how many were removed.
    async fn prune_expired(&self) -> AppResult<u64>;
}

/// Hex SHA-256 of a token value.
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
