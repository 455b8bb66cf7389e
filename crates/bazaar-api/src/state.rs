//! Application state shared across all handlers and extractors.

use std::sync::Arc;

use bazaar_auth::{AuthService, Authenticator, PermissionEngine, RevocationStore, SessionControl};
use bazaar_cache::CacheManager;
use bazaar_core::config::AppConfig;
use bazaar_database::DatabasePool;

/// Shared dependencies, passed to every handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Cache manager (Redis or in-memory).
    pub cache: Arc<CacheManager>,
    /// PostgreSQL pool, absent when running on in-memory stores.
    pub database: Option<DatabasePool>,
    /// Negative list of revoked tokens, shared with the background sweeper.
    pub revocations: Arc<dyn RevocationStore>,
    /// Bearer token verification pipeline.
    pub authenticator: Arc<Authenticator>,
    /// Account lifecycle operations.
    pub auth_service: Arc<AuthService>,
    /// Compound revocation operations.
    pub sessions: Arc<SessionControl>,
    /// Permission resolution engine.
    pub permissions: Arc<PermissionEngine>,
}
