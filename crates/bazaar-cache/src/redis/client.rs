//! Redis connection management.

use redis::Client;
use redis::aio::ConnectionManager;
use tracing::{debug, info, warn};

use bazaar_core::config::cache::RedisCacheConfig;
use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;

/// Redis client wrapper with connection management.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis connection manager (multiplexed, reconnecting).
    conn: ConnectionManager,
    /// Key prefix for all keys.
    key_prefix: String,
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

impl RedisClient {
    /// Create a new Redis client from configuration.
    pub async fn connect(config: &RedisCacheConfig) -> AppResult<Self> {
        info!(url = %mask_redis_url(&config.url), "Connecting to Redis");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Failed to create Redis client", e)
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Failed to connect to Redis", e)
        })?;

        info!("Successfully connected to Redis");
        check_eviction_policy(&conn).await;
        Ok(Self {
            conn,
            key_prefix: config.key_prefix.clone(),
        })
    }

    /// Get a mutable clone of the connection manager.
    pub fn conn_mut(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Build a full key with the configured prefix.
    pub fn prefixed_key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }
}

/// Warns when the server may evict keys that still carry a TTL.
///
/// Every revocation key has a TTL, so any policy other than `noeviction`
/// can drop one before its token expires.
async fn check_eviction_policy(conn: &ConnectionManager) {
    let mut conn = conn.clone();
    let reply: Result<Vec<String>, _> = redis::cmd("CONFIG")
        .arg("GET")
        .arg("maxmemory-policy")
        .query_async(&mut conn)
        .await;

    match reply {
        Ok(pair) => match pair.get(1).map(String::as_str) {
            Some("noeviction") => debug!("Redis maxmemory-policy is noeviction"),
            Some(policy) if evicts_ttl_keys(policy) => warn!(
                policy = %policy,
                "Redis may evict revocation entries under memory pressure; set maxmemory-policy to noeviction"
            ),
            _ => {}
        },
        Err(e) => debug!(error = %e, "Could not read Redis maxmemory-policy"),
    }
}

fn evicts_ttl_keys(policy: &str) -> bool {
    policy.starts_with("allkeys-") || policy.starts_with("volatile-")
}

/// Mask password in Redis URL for safe logging.
fn mask_redis_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_redis_url() {
        assert_eq!(
            mask_redis_url("redis://:hunter2@cache:6379"),
            "redis://:****@cache:6379"
        );
        assert_eq!(mask_redis_url("redis://localhost:6379"), "redis://localhost:6379");
    }

    #[test]
    fn test_eviction_policies() {
        assert!(!evicts_ttl_keys("noeviction"));
        assert!(evicts_ttl_keys("volatile-ttl"));
        assert!(evicts_ttl_keys("allkeys-lru"));
    }
}
