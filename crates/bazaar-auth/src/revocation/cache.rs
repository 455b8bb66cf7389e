//! Revocation store on top of the cache provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use bazaar_cache::keys;
use bazaar_cache::provider::CacheManager;
use bazaar_core::result::AppResult;
use bazaar_core::traits::CacheProvider;
use bazaar_entity::token::TokenKind;

use super::store::{RevocationStatus, RevocationStore, token_digest};

/// Keeps revocations in the cache with native per-entry TTL.
///
/// Two keys are written per token: a lookup key used for idempotence and
/// `is_revoked`, and a subject-scoped key used for counting.
#[derive(Debug, Clone)]
pub struct CacheRevocationStore {
    cache: Arc<CacheManager>,
}

impl CacheRevocationStore {
    /// Creates a store over the given cache manager.
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl RevocationStore for CacheRevocationStore {
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

        let digest = token_digest(token);
        let inserted = self
            .cache
            .set_nx(&keys::revoked_lookup(&digest), subject_id, ttl)
            .await?;
        if !inserted {
            debug!(subject = %subject_id, "Token already on revocation list");
            return Ok(RevocationStatus::AlreadyRevoked);
        }

        self.cache
            .set(
                &keys::revoked_token(subject_id, &digest),
                kind.as_str(),
                ttl,
            )
            .await?;
        Ok(RevocationStatus::Revoked)
    }

    async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        self.cache
            .exists(&keys::revoked_lookup(&token_digest(token)))
            .await
    }

    async fn count_for_subject(&self, subject_id: &str) -> AppResult<u64> {
        self.cache
            .count_prefix(&keys::revoked_subject_prefix(subject_id))
            .await
    }

    async fn prune_expired(&self) -> AppResult<u64> {
        self.cache.purge_expired().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CacheRevocationStore {
        CacheRevocationStore::new(Arc::new(CacheManager::in_memory()))
    }

    #[tokio::test]
    async fn test_record_then_listed() {
        let store = store();
        assert!(!store.is_revoked("t1").await.unwrap());

        let status = store
            .record("t1", "u1", TokenKind::Access, Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(status, RevocationStatus::Revoked);
        assert!(store.is_revoked("t1").await.unwrap());
        assert!(!store.is_revoked("t2").await.unwrap());
    }

    #[tokio::test]
    async fn test_second_record_is_already_revoked() {
        let store = store();
        let ttl = Duration::from_secs(60);
        store.record("t1", "u1", TokenKind::Access, ttl).await.unwrap();

        let again = store.record("t1", "u1", TokenKind::Access, ttl).await.unwrap();

        assert_eq!(again, RevocationStatus::AlreadyRevoked);
        assert_eq!(store.count_for_subject("u1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_count_is_per_subject() {
        let store = store();
        let ttl = Duration::from_secs(60);
        store.record("a", "u1", TokenKind::Access, ttl).await.unwrap();
        store.record("b", "u1", TokenKind::Refresh, ttl).await.unwrap();
        store.record("c", "u2", TokenKind::Access, ttl).await.unwrap();

        assert_eq!(store.count_for_subject("u1").await.unwrap(), 2);
        assert_eq!(store.count_for_subject("u2").await.unwrap(), 1);
        assert_eq!(store.count_for_subject("u3").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_entry_expires_with_token() {
        let store = store();
        store
            .record("t1", "u1", TokenKind::Access, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(store.is_revoked("t1").await.unwrap());

        tokio::time::sleep(Duration::from_millis(1200)).await;

        assert!(!store.is_revoked("t1").await.unwrap());
        assert_eq!(store.count_for_subject("u1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_revocations_survive_beyond_initial_capacity() {
        use bazaar_cache::memory::MemoryCacheProvider;
        use bazaar_core::config::cache::MemoryCacheConfig;

        let provider = MemoryCacheProvider::new(&MemoryCacheConfig { initial_capacity: 8 });
        let store = CacheRevocationStore::new(Arc::new(CacheManager::from_provider(Arc::new(
            provider,
        ))));
        let ttl = Duration::from_secs(600);
        for i in 0..200 {
            store
                .record(&format!("token-{i}"), "u1", TokenKind::Access, ttl)
                .await
                .unwrap();
        }

        store.prune_expired().await.unwrap();

        for i in 0..200 {
            assert!(store.is_revoked(&format!("token-{i}")).await.unwrap());
        }
        assert_eq!(store.count_for_subject("u1").await.unwrap(), 200);
    }
}
