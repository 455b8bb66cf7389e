//! In-memory cache implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use bazaar_core::config::cache::MemoryCacheConfig;
use bazaar_core::result::AppResult;
use bazaar_core::traits::cache::CacheProvider;

/// A cached value together with the TTL it was inserted with.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expires every entry after its own TTL.
struct PerEntryExpiry;

impl Expiry<String, Entry> for PerEntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-memory cache provider using moka.
///
/// The cache is built without `max_capacity`, so moka never evicts an entry
/// for size. Per-entry expiry is the only way out. Writes are visible to every subsequent read on the same process as soon
/// as the insert future resolves.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    cache: Cache<String, Entry>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .initial_capacity(config.initial_capacity)
            .expire_after(PerEntryExpiry)
            .build();

        Self { cache }
    }

    fn entry(value: &str, ttl: Duration) -> Entry {
        Entry {
            value: value.to_string(),
            ttl,
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(key.to_string(), Self::entry(value, ttl))
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        // The entry API inserts atomically; `is_fresh` tells whether this
        // call was the one that inserted.
        let entry = self
            .cache
            .entry(key.to_string())
            .or_insert(Self::entry(value, ttl))
            .await;
        Ok(entry.is_fresh())
    }

    async fn count_prefix(&self, prefix: &str) -> AppResult<u64> {
        let count = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .count();
        Ok(count as u64)
    }

    async fn purge_expired(&self) -> AppResult<u64> {
        let before = self.cache.entry_count();
        self.cache.run_pending_tasks().await;
        Ok(before.saturating_sub(self.cache.entry_count()))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
