//! Admin handlers: bulk revocation and forced password change.

use axum::Json;
use axum::extract::{Path, State};

use crate::dto::response::{ApiResponse, MessageResponse, WatermarkResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// POST /api/admin/users/{id}/revoke-sessions
pub async fn revoke_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<WatermarkResponse>>, ApiError> {
    require_admin(&auth)?;

    let password_changed_at = state
        .sessions
        .revoke_all_user_sessions(&auth.principal, &user_id)
        .await?;

    Ok(Json(ApiResponse::ok(WatermarkResponse {
        user_id,
        password_changed_at,
    })))
}

/// POST /api/admin/users/{id}/force-password-change
pub async fn force_password_change(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    require_admin(&auth)?;

    state
        .sessions
        .force_password_change(&user_id, &auth.principal)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "User must change password at next login",
    ))))
}
