//! Application builder: wires stores, auth components, and the router.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use bazaar_auth::identity::IdentityProviders;
use bazaar_auth::rbac::{DatabaseRoleStore, OwnershipRegistry};
use bazaar_auth::{
    AuthService, Authenticator, CacheRevocationStore, CredentialStore, DatabaseCredentialStore,
    DatabaseRevocationStore, JwtDecoder, JwtEncoder, MemoryCredentialStore, PasswordChangeGuard,
    PermissionEngine, RbacPolicies, RevocationStore, RoleStore, SessionControl,
};
use bazaar_cache::CacheManager;
use bazaar_core::config::{AppConfig, RevocationBackend};
use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_database::DatabasePool;
use bazaar_database::repositories::{CredentialRepository, RevocationRepository, RoleRepository};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Assembles the application state.
///
/// With a database, credentials, roles and ownership lookups use
/// PostgreSQL; without one they are held in memory. Revocations follow
/// `revocation.backend`.
pub fn build_state(
    config: AppConfig,
    cache: Arc<CacheManager>,
    database: Option<DatabasePool>,
    providers: IdentityProviders,
) -> AppResult<AppState> {
    let (credentials, roles, ownership): (
        Arc<dyn CredentialStore>,
        Arc<dyn RoleStore>,
        OwnershipRegistry,
    ) = match &database {
        Some(db) => {
            info!("Using PostgreSQL credential and role stores");
            (
                Arc::new(DatabaseCredentialStore::new(CredentialRepository::new(
                    db.pool().clone(),
                ))),
                Arc::new(DatabaseRoleStore::new(RoleRepository::new(
                    db.pool().clone(),
                ))),
                OwnershipRegistry::new().with_database_defaults(db),
            )
        }
        None => {
            info!("No database configured, using in-memory credential and role stores");
            (
                Arc::new(MemoryCredentialStore::new()),
                Arc::new(RbacPolicies::new()),
                OwnershipRegistry::new(),
            )
        }
    };

    let revocations: Arc<dyn RevocationStore> = match (config.revocation.backend, &database) {
        (RevocationBackend::Cache, _) => Arc::new(CacheRevocationStore::new(Arc::clone(&cache))),
        (RevocationBackend::Database, Some(db)) => Arc::new(DatabaseRevocationStore::new(
            RevocationRepository::new(db.pool().clone()),
        )),
        (RevocationBackend::Database, None) => {
            return Err(AppError::configuration(
                "revocation.backend = \"database\" requires a [database] section",
            ));
        }
    };
    info!(backend = ?config.revocation.backend, "Revocation store ready");

    let encoder = Arc::new(JwtEncoder::new(&config.auth));
    let decoder = Arc::new(JwtDecoder::new(&config.auth));
    let authenticator = Authenticator::new(
        Arc::clone(&decoder),
        Arc::clone(&revocations),
        Arc::clone(&credentials),
    );
    let sessions = SessionControl::new(
        Arc::clone(&credentials),
        Arc::clone(&revocations),
        Arc::clone(&decoder),
        Arc::clone(&encoder),
    );
    let auth_service = AuthService::new(
        Arc::clone(&credentials),
        PasswordChangeGuard::from_config(&config.auth),
        Arc::clone(&encoder),
        authenticator.clone(),
        sessions.clone(),
        providers,
    );
    let permissions = PermissionEngine::new(roles, ownership);

    Ok(AppState {
        config: Arc::new(config),
        cache,
        database,
        revocations,
        authenticator: Arc::new(authenticator),
        auth_service: Arc::new(auth_service),
        sessions: Arc::new(sessions),
        permissions: Arc::new(permissions),
    })
}
