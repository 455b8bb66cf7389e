//! Session control: revoke one token, all tokens, or all but the current.
//!
//! No registry of live tokens exists. Bulk revocation moves the
//! credential's `password_changed_at` watermark; single revocation goes
//! through the revocation store.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::credential::CredentialStore;
use crate::error::{AuthError, AuthResult};
use crate::jwt::{Claims, JwtDecoder, JwtEncoder, TokenPair};
use crate::principal::Principal;
use crate::revocation::{RevocationStatus, RevocationStore};

/// Result of revoking a single token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationOutcome {
    /// Always `true`: the token is no longer usable.
    pub revoked: bool,
    /// `"already revoked"` on a repeat call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// `"already expired"` when no action was needed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RevocationOutcome {
    fn fresh() -> Self {
        Self {
            revoked: true,
            message: None,
            reason: None,
        }
    }

    fn already_revoked() -> Self {
        Self {
            revoked: true,
            message: Some("already revoked".to_string()),
            reason: None,
        }
    }

    fn already_expired() -> Self {
        Self {
            revoked: true,
            message: None,
            reason: Some("already expired".to_string()),
        }
    }
}

/// Approximate session view derived from the negative list.
///
/// Live sessions cannot be enumerated; callers must not use this for
/// exact accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveSessions {
    /// Unexpired revocation entries for the subject.
    pub revoked_tokens: u64,
    /// Tokens issued before this instant are rejected.
    pub password_changed_at: Option<DateTime<Utc>>,
    /// Always `true`.
    pub approximate: bool,
}

/// Orchestrates revocation over the credential and revocation stores.
#[derive(Debug, Clone)]
pub struct SessionControl {
    credentials: Arc<dyn CredentialStore>,
    revocations: Arc<dyn RevocationStore>,
    decoder: Arc<JwtDecoder>,
    encoder: Arc<JwtEncoder>,
}

impl SessionControl {
    /// Creates the service.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        revocations: Arc<dyn RevocationStore>,
        decoder: Arc<JwtDecoder>,
        encoder: Arc<JwtEncoder>,
    ) -> Self {
        Self {
            credentials,
            revocations,
            decoder,
            encoder,
        }
    }

    /// Puts a token with known claims on the revocation list for the rest
    /// of its lifetime.
    pub(crate) async fn revoke_claims(
        &self,
        token: &str,
        claims: &Claims,
    ) -> AuthResult<RevocationOutcome> {
        if claims.is_expired() {
            return Ok(RevocationOutcome::already_expired());
        }

        let ttl = claims.remaining().to_std().unwrap_or_default();
        let status = self
            .revocations
            .record(token, &claims.id, claims.typ, ttl)
            .await
            .map_err(|e| AuthError::store_fault(&claims.id, e))?;

        match status {
            RevocationStatus::Revoked => {
                info!(subject = %claims.id, kind = %claims.typ, "Token revoked");
                Ok(RevocationOutcome::fresh())
            }
            RevocationStatus::AlreadyRevoked => Ok(RevocationOutcome::already_revoked()),
        }
    }

    /// Revokes one token. The requester must own it or be a moderator/admin.
    pub async fn revoke_specific_token(
        &self,
        token: &str,
        requester: &Principal,
    ) -> AuthResult<RevocationOutcome> {
        let claims = self.decoder.decode_signed(token)?;

        if claims.id != requester.id && !requester.is_moderator_or_admin() {
            return Err(AuthError::ForeignToken);
        }

        self.revoke_claims(token, &claims).await
    }

    /// Invalidates every token of `target_id` issued before now.
    pub async fn revoke_all_user_sessions(
        &self,
        acting: &Principal,
        target_id: &str,
    ) -> AuthResult<DateTime<Utc>> {
        if !acting.is_admin() {
            return Err(AuthError::AdminRequired);
        }
        let changed_at = self.bump_watermark(target_id, Utc::now()).await?;
        info!(admin = %acting.id, target = %target_id, "Revoked all sessions");
        Ok(changed_at)
    }

    /// Invalidates all of the caller's tokens, including the presenting
    /// one, and returns a fresh pair so the caller stays signed in.
    ///
    /// The watermark is written truncated to the whole second so the fresh
    /// pair, whose `iat` is that second, passes it. Tokens on other devices
    /// minted within the same second are indistinguishable from the pair
    /// and survive.
    pub async fn revoke_other_sessions(
        &self,
        current_token: &str,
        requester: &Principal,
    ) -> AuthResult<TokenPair> {
        let claims = self.decoder.verify(current_token)?;
        if claims.id != requester.id {
            return Err(AuthError::ForeignToken);
        }

        self.bump_watermark(&requester.id, Utc::now().trunc_subsecs(0))
            .await?;
        self.revoke_claims(current_token, &claims).await?;

        let pair = self
            .encoder
            .generate_token_pair(&requester.id)
            .map_err(|e| AuthError::store_fault(&requester.id, e))?;
        info!(subject = %requester.id, "Revoked other sessions, reissued tokens");
        Ok(pair)
    }

    /// Invalidates every token of `target_id` and flags the credential as
    /// requiring a real password change.
    pub async fn force_password_change(
        &self,
        target_id: &str,
        acting: &Principal,
    ) -> AuthResult<()> {
        if !acting.is_admin() {
            return Err(AuthError::AdminRequired);
        }
        self.bump_watermark(target_id, Utc::now()).await?;
        self.credentials
            .set_must_change_password(target_id, true)
            .await
            .map_err(|e| AuthError::target_fault(target_id, e))?;
        info!(admin = %acting.id, target = %target_id, "Forced password change");
        Ok(())
    }

    /// Derived approximation of the subject's sessions.
    pub async fn get_active_sessions(&self, user_id: &str) -> AuthResult<ActiveSessions> {
        let revoked_tokens = self
            .revocations
            .count_for_subject(user_id)
            .await
            .map_err(|e| AuthError::store_fault(user_id, e))?;
        let credential = self
            .credentials
            .find(user_id)
            .await
            .map_err(|e| AuthError::store_fault(user_id, e))?
            .ok_or(AuthError::UserNotFound)?;

        Ok(ActiveSessions {
            revoked_tokens,
            password_changed_at: credential.password_changed_at,
            approximate: true,
        })
    }

    async fn bump_watermark(
        &self,
        user_id: &str,
        changed_at: DateTime<Utc>,
    ) -> AuthResult<DateTime<Utc>> {
        self.credentials
            .set_password_changed_at(user_id, changed_at)
            .await
            .map_err(|e| AuthError::target_fault(user_id, e))?;
        info!(subject = %user_id, changed_at = %changed_at, "Watermark moved");
        Ok(changed_at)
    }
}
