//! Revocation store over the `token_revocations` table.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_database::repositories::RevocationRepository;
use bazaar_entity::token::{RevocationEntry, TokenKind};

use super::store::{RevocationStatus, RevocationStore, token_digest};

/// PostgreSQL-backed revocation store. Expired rows are ignored on read
/// and removed by [`RevocationSweeper`](super::RevocationSweeper).
#[derive(Debug, Clone)]
pub struct DatabaseRevocationStore {
    repo: RevocationRepository,
}

impl DatabaseRevocationStore {
    /// Wraps a revocation repository.
    pub fn new(repo: RevocationRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl RevocationStore for DatabaseRevocationStore {
    async fn record(
        &self,
        token: &str,
        subject_id: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> AppResult<RevocationStatus> {
        if ttl.is_zero() {
            return Ok(RevocationStatus::Revoked);
        }

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AppError::internal(format!("Revocation TTL out of range: {e}")))?;
        let entry = RevocationEntry {
            token: token_digest(token),
            user_id: subject_id.to_string(),
            kind,
            expires_at: Utc::now() + ttl,
        };

        if self.repo.insert(&entry).await? {
            Ok(RevocationStatus::Revoked)
        } else {
            Ok(RevocationStatus::AlreadyRevoked)
        }
    }

    async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        self.repo
            .exists_active(&token_digest(token), Utc::now())
            .await
    }

    async fn count_for_subject(&self, subject_id: &str) -> AppResult<u64> {
        self.repo.count_active_for_user(subject_id, Utc::now()).await
    }

    async fn prune_expired(&self) -> AppResult<u64> {
        self.repo.delete_expired(Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_database::testing::ScratchDb;

    #[tokio::test]
    async fn test_repeat_record_is_already_revoked() {
        let Some(db) = ScratchDb::open(true).await.unwrap() else {
            return;
        };
        let store = DatabaseRevocationStore::new(RevocationRepository::new(db.pool.clone()));
        let ttl = Duration::from_secs(600);

        assert!(!store.is_revoked("tok").await.unwrap());
        assert_eq!(
            store.record("tok", "u1", TokenKind::Access, ttl).await.unwrap(),
            RevocationStatus::Revoked
        );
        assert_eq!(
            store.record("tok", "u1", TokenKind::Access, ttl).await.unwrap(),
            RevocationStatus::AlreadyRevoked
        );
        assert!(store.is_revoked("tok").await.unwrap());
        assert_eq!(store.count_for_subject("u1").await.unwrap(), 1);

        db.finish().await.unwrap();
    }

    #[tokio::test]
    async fn test_entry_lapses_with_token_and_is_pruned() {
        let Some(db) = ScratchDb::open(true).await.unwrap() else {
            return;
        };
        let store = DatabaseRevocationStore::new(RevocationRepository::new(db.pool.clone()));
        store
            .record("short", "u1", TokenKind::Refresh, Duration::from_millis(300))
            .await
            .unwrap();
        assert!(store.is_revoked("short").await.unwrap());

        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(!store.is_revoked("short").await.unwrap());
        assert_eq!(store.count_for_subject("u1").await.unwrap(), 0);
        assert_eq!(store.prune_expired().await.unwrap(), 1);

        db.finish().await.unwrap();
    }
}
