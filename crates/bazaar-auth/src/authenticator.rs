//! Per-request token verification pipeline.

use std::sync::Arc;

use tracing::debug;

use bazaar_entity::token::TokenKind;
use bazaar_entity::user::Credential;

use crate::credential::CredentialStore;
use crate::error::{AuthError, AuthResult};
use crate::jwt::{Claims, JwtDecoder};
use crate::principal::Principal;
use crate::revocation::RevocationStore;

/// Turns a bearer token into a [`Principal`].
///
/// Checks run cheapest first: signature, expiry, token kind, revocation
/// list, then the credential watermark.
#[derive(Debug, Clone)]
pub struct Authenticator {
    decoder: Arc<JwtDecoder>,
    revocations: Arc<dyn RevocationStore>,
    credentials: Arc<dyn CredentialStore>,
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> AuthResult<&str> {
    let value = header.ok_or(AuthError::Unauthenticated)?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::Unauthenticated)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::Unauthenticated);
    }
    Ok(token)
}

impl Authenticator {
    /// Creates the pipeline over its three collaborators.
    pub fn new(
        decoder: Arc<JwtDecoder>,
        revocations: Arc<dyn RevocationStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            decoder,
            revocations,
            credentials,
        }
    }

    /// The decoder used for signature checks.
    pub fn decoder(&self) -> &JwtDecoder {
        &self.decoder
    }

    /// Authorizes a request from its raw `Authorization` header.
    pub async fn authorize(&self, header: Option<&str>) -> AuthResult<Principal> {
        let token = bearer_token(header)?;
        self.authenticate(token).await
    }

    /// Verifies an access token and returns its principal.
    pub async fn authenticate(&self, token: &str) -> AuthResult<Principal> {
        let (_, credential) = self.verify(token, TokenKind::Access).await?;
        Ok(Principal::new(credential.id, credential.role))
    }

    /// Runs every acceptance check for a token of the expected kind.
    pub async fn verify(&self, token: &str, expected: TokenKind) -> AuthResult<(Claims, Credential)> {
        let claims = self.decoder.verify(token)?;

        if claims.typ != expected {
            debug!(subject = %claims.id, kind = %claims.typ, "Rejected token of wrong kind");
            return Err(AuthError::TokenInvalid);
        }

        let revoked = self
            .revocations
            .is_revoked(token)
            .await
            .map_err(|e| AuthError::store_fault(&claims.id, e))?;
        if revoked {
            debug!(subject = %claims.id, "Rejected revoked token");
            return Err(AuthError::TokenRevoked);
        }

        let credential = self
            .credentials
            .find(&claims.id)
            .await
            .map_err(|e| AuthError::store_fault(&claims.id, e))?
            .ok_or(AuthError::SubjectNotFound)?;

        if credential.changed_password_after(claims.iat) {
            debug!(subject = %claims.id, iat = claims.iat, "Rejected token older than watermark");
            return Err(AuthError::PasswordChanged);
        }

        Ok((claims, credential))
    }
}
