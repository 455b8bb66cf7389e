//! Token creation with injected secret and TTLs.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_core::config::AuthConfig;
use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_entity::token::TokenKind;

use super::claims::Claims;

/// Creates signed access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Default access token lifetime.
    access_ttl: chrono::Duration,
    /// Default refresh token lifetime.
    refresh_ttl: chrono::Duration,
    /// `iss` claim, when configured.
    issuer: Option<String>,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// A freshly signed token and its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Compact serialized token.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful token pair generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: chrono::Duration::minutes(config.jwt_access_ttl_minutes as i64),
            refresh_ttl: chrono::Duration::hours(config.jwt_refresh_ttl_hours as i64),
            issuer: config.jwt_issuer.clone(),
        }
    }

    /// Default lifetime for a token kind.
    pub fn default_ttl(&self, kind: TokenKind) -> chrono::Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Issues a token for `subject_id` valid for `ttl` from now.
    pub fn issue(
        &self,
        subject_id: &str,
        kind: TokenKind,
        ttl: chrono::Duration,
    ) -> AppResult<IssuedToken> {
        self.issue_at(subject_id, kind, Utc::now(), ttl)
    }

    /// Issues a token with an explicit issue time.
    pub fn issue_at(
        &self,
        subject_id: &str,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> AppResult<IssuedToken> {
        let expires_at = issued_at + ttl;
        let claims = Claims {
            id: subject_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            typ: kind,
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode {kind} token: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Issues a token of the given kind with its default lifetime.
    pub fn issue_default(&self, subject_id: &str, kind: TokenKind) -> AppResult<IssuedToken> {
        self.issue(subject_id, kind, self.default_ttl(kind))
    }

    /// Generates a new access + refresh token pair for the given subject.
    pub fn generate_token_pair(&self, subject_id: &str) -> AppResult<TokenPair> {
        let access = self.issue_default(subject_id, TokenKind::Access)?;
        let refresh = self.issue_default(subject_id, TokenKind::Refresh)?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        })
    }
}
