//! `AuthUser` extractor: verifies the bearer token and yields the principal.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use bazaar_auth::Principal;
use bazaar_auth::authenticator::bearer_token;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Verified identity and role.
    pub principal: Principal,
    /// The presented access token, for operations that revoke it.
    pub token: String,
}

impl std::ops::Deref for AuthUser {
    type Target = Principal;
    fn deref(&self) -> &Self::Target {
        &self.principal
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = bearer_token(header)?;
        let principal = state.authenticator.authenticate(token).await?;

        Ok(AuthUser {
            principal,
            token: token.to_string(),
        })
    }
}
