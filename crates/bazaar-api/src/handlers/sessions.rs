//! Session control handlers for the signed-in caller.

use axum::Json;
use axum::extract::{Path, State};

use bazaar_auth::{ActiveSessions, RevocationOutcome, TokenPair};

use crate::dto::request::RevokeTokenRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::rbac::require_resource_permission;
use crate::state::AppState;

/// POST /api/sessions/revoke
pub async fn revoke_token(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<RevokeTokenRequest>,
) -> Result<Json<ApiResponse<RevocationOutcome>>, ApiError> {
    let outcome = state
        .sessions
        .revoke_specific_token(&req.token, &auth.principal)
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// POST /api/sessions/revoke-others
pub async fn revoke_others(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let tokens = state
        .sessions
        .revoke_other_sessions(&auth.token, &auth.principal)
        .await?;
    Ok(Json(ApiResponse::ok(tokens)))
}

/// GET /api/sessions/active
pub async fn active(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<ActiveSessions>>, ApiError> {
    let sessions = state.sessions.get_active_sessions(&auth.id).await?;
    Ok(Json(ApiResponse::ok(sessions)))
}

/// GET /api/users/{id}/sessions
///
/// Owner, moderator or admin only.
pub async fn user_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<ActiveSessions>>, ApiError> {
    require_resource_permission(&state, &auth, "user", "update", Some(&user_id)).await?;

    let sessions = state.sessions.get_active_sessions(&user_id).await?;
    Ok(Json(ApiResponse::ok(sessions)))
}
