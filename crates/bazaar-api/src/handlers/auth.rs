//! Auth handlers: register, login, refresh, logout, password, me, oauth.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use bazaar_core::error::AppError;
use bazaar_entity::identity::IdentityProviderKind;
use bazaar_entity::user::UserRole;

use crate::dto::request::{
    ChangePasswordRequest, LoginRequest, LogoutRequest, OAuthRequest, RefreshRequest,
    RegisterRequest,
};
use crate::dto::response::{
    AccessTokenResponse, ApiResponse, AuthResponse, MessageResponse, UserResponse,
};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let signed = state
        .auth_service
        .register(&req.email, &req.password, UserRole::User)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AuthResponse {
            tokens: signed.tokens,
            user: signed.credential.into(),
        })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let signed = state.auth_service.login(&req.email, &req.password).await?;

    Ok(Json(ApiResponse::ok(AuthResponse {
        tokens: signed.tokens,
        user: signed.credential.into(),
    })))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<AccessTokenResponse>>, ApiError> {
    let issued = state.auth_service.refresh(&req.refresh_token).await?;

    Ok(Json(ApiResponse::ok(AccessTokenResponse {
        access_token: issued.token,
        access_expires_at: issued.expires_at,
    })))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Bytes,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let req: LogoutRequest = if body.iter().all(u8::is_ascii_whitespace) {
        LogoutRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?
    };

    state
        .auth_service
        .logout(&auth.principal, &auth.token, req.refresh_token.as_deref())
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Logged out successfully",
    ))))
}

/// PATCH /api/auth/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let tokens = state
        .auth_service
        .change_password(&auth.principal, &req.current_password, &req.new_password)
        .await?;
    let credential = state.auth_service.current(&auth.principal).await?;

    Ok(Json(ApiResponse::ok(AuthResponse {
        tokens,
        user: credential.into(),
    })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let credential = state.auth_service.current(&auth.principal).await?;
    Ok(Json(ApiResponse::ok(credential.into())))
}

/// POST /api/auth/oauth/{provider}
pub async fn oauth(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(req): Json<OAuthRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let provider: IdentityProviderKind = provider.parse()?;
    let signed = state.auth_service.sign_in_with(provider, &req.code).await?;

    Ok(Json(ApiResponse::ok(AuthResponse {
        tokens: signed.tokens,
        user: signed.credential.into(),
    })))
}
