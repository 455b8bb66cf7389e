//! Route definitions for the Bazaar HTTP API.
//!
//! All routes are mounted under `/api`.

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes and thread `AppState` through them.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(session_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Auth endpoints
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/password", patch(handlers::auth::change_password))
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/oauth/{provider}", post(handlers::auth::oauth))
}

/// Self-service session control
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions/revoke", post(handlers::sessions::revoke_token))
        .route("/sessions/revoke-others", post(handlers::sessions::revoke_others))
        .route("/sessions/active", get(handlers::sessions::active))
        .route("/users/{id}/sessions", get(handlers::sessions::user_sessions))
}

/// Admin-only endpoints
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/users/{id}/revoke-sessions",
            post(handlers::admin::revoke_sessions),
        )
        .route(
            "/admin/users/{id}/force-password-change",
            post(handlers::admin::force_password_change),
        )
}

/// Health checks
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
