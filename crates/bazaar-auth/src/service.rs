//! Account-facing operations: register, login, refresh, logout, password
//! change, and external sign-in.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_entity::identity::IdentityProviderKind;
use bazaar_entity::token::TokenKind;
use bazaar_entity::user::{Credential, NewCredential, UserRole};

use crate::authenticator::Authenticator;
use crate::credential::CredentialStore;
use crate::error::AuthError;
use crate::identity::{IdentityLinker, IdentityProviders};
use crate::jwt::{IssuedToken, JwtEncoder, TokenPair};
use crate::password::{PasswordChangeGuard, PasswordHasher};
use crate::principal::Principal;
use crate::session::SessionControl;

/// A credential together with a freshly issued token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedIn {
    /// The signed-in account.
    pub credential: Credential,
    /// Tokens for the account.
    pub tokens: TokenPair,
}

/// Orchestrates the account lifecycle on top of the core components.
#[derive(Debug, Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    guard: PasswordChangeGuard,
    encoder: Arc<JwtEncoder>,
    authenticator: Authenticator,
    sessions: SessionControl,
    linker: IdentityLinker,
    providers: IdentityProviders,
}

impl AuthService {
    /// Creates the service.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        guard: PasswordChangeGuard,
        encoder: Arc<JwtEncoder>,
        authenticator: Authenticator,
        sessions: SessionControl,
        providers: IdentityProviders,
    ) -> Self {
        Self {
            linker: IdentityLinker::new(credentials.clone()),
            credentials,
            hasher: PasswordHasher::new(),
            guard,
            encoder,
            authenticator,
            sessions,
            providers,
        }
    }

    fn signed_in(&self, credential: Credential) -> AppResult<SignedIn> {
        let tokens = self.encoder.generate_token_pair(&credential.id)?;
        Ok(SignedIn { credential, tokens })
    }

    /// Creates a password credential and signs it in.
    pub async fn register(&self, email: &str, password: &str, role: UserRole) -> AppResult<SignedIn> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::validation("Email and password are required"));
        }

        let password_hash = self.hasher.hash_password(password)?;
        let credential = self
            .credentials
            .create(NewCredential {
                email: email.to_string(),
                password_hash: Some(password_hash),
                role,
            })
            .await?;

        info!(subject = %credential.id, role = %credential.role, "Account registered");
        self.signed_in(credential)
    }

    /// Verifies email and password and issues a token pair.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<SignedIn> {
        let credential = self
            .credentials
            .find_by_email(email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let matches = match credential.password_hash.as_deref() {
            Some(hash) => self.hasher.verify_password(password, hash)?,
            None => false,
        };
        if !matches {
            return Err(AuthError::InvalidCredentials.into());
        }

        info!(subject = %credential.id, "Login succeeded");
        self.signed_in(credential)
    }

    /// Exchanges a refresh token for a new access token. The refresh token
    /// itself is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<IssuedToken> {
        let (claims, _) = self
            .authenticator
            .verify(refresh_token, TokenKind::Refresh)
            .await
            .map_err(|e| {
                if e.is_token_rejection() {
                    AuthError::RefreshInvalid
                } else {
                    e
                }
            })?;

        Ok(self.encoder.issue_default(&claims.id, TokenKind::Access)?)
    }

    /// Revokes the presenting access token and, if given, a refresh token
    /// belonging to the same principal. Nothing is revoked unless both
    /// tokens check out.
    pub async fn logout(
        &self,
        principal: &Principal,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> AppResult<()> {
        let access = self.authenticator.decoder().decode_signed(access_token)?;

        let refresh = match refresh_token {
            Some(token) => {
                let claims = self.authenticator.decoder().decode_signed(token)?;
                if claims.id != principal.id {
                    return Err(AuthError::ForeignToken.into());
                }
                if claims.typ != TokenKind::Refresh {
                    return Err(AuthError::RefreshInvalid.into());
                }
                Some((token, claims))
            }
            None => None,
        };

        self.sessions.revoke_claims(access_token, &access).await?;
        if let Some((token, claims)) = refresh {
            self.sessions.revoke_claims(token, &claims).await?;
        }

        info!(subject = %principal.id, "Logged out");
        Ok(())
    }

    /// Changes the password, moving the watermark so that every earlier
    /// token is rejected, and returns a fresh pair.
    pub async fn change_password(
        &self,
        principal: &Principal,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<TokenPair> {
        if new_password.is_empty() {
            return Err(AppError::validation("New password is required"));
        }

        let credential = self
            .credentials
            .find(&principal.id)
            .await?
            .ok_or(AuthError::SubjectNotFound)?;

        let matches = match credential.password_hash.as_deref() {
            Some(hash) => self.hasher.verify_password(current_password, hash)?,
            None => false,
        };
        if !matches {
            return Err(AuthError::IncorrectPassword.into());
        }

        let new_hash = self.hasher.hash_password(new_password)?;
        self.guard
            .set_password(self.credentials.as_ref(), &principal.id, &new_hash)
            .await?;

        self.encoder.generate_token_pair(&principal.id)
    }

    /// Signs in through an external identity provider.
    pub async fn sign_in_with(
        &self,
        provider: IdentityProviderKind,
        code: &str,
    ) -> AppResult<SignedIn> {
        let profile = self.providers.get(provider)?.exchange(code).await?;
        if profile.provider != provider {
            return Err(AppError::external_service(format!(
                "Provider '{provider}' returned a '{}' profile",
                profile.provider
            )));
        }

        let credential = self.linker.link(&profile).await?;
        info!(subject = %credential.id, provider = %provider, "External sign-in");
        self.signed_in(credential)
    }

    /// The credential record behind a principal.
    pub async fn current(&self, principal: &Principal) -> AppResult<Credential> {
        Ok(self
            .credentials
            .find(&principal.id)
            .await?
            .ok_or(AuthError::SubjectNotFound)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use bazaar_cache::CacheManager;
    use bazaar_core::config::AuthConfig;
    use bazaar_core::error::ErrorKind;
    use bazaar_entity::identity::ExternalProfile;

    use crate::credential::MemoryCredentialStore;
    use crate::identity::IdentityProvider;
    use crate::jwt::JwtDecoder;
    use crate::revocation::{CacheRevocationStore, RevocationStore};

    #[derive(Debug)]
    struct FakeGoogle;

    #[async_trait]
    impl IdentityProvider for FakeGoogle {
        fn kind(&self) -> IdentityProviderKind {
            IdentityProviderKind::Google
        }

        async fn exchange(&self, code: &str) -> AppResult<ExternalProfile> {
            Ok(ExternalProfile {
                provider: IdentityProviderKind::Google,
                external_id: format!("g-{code}"),
                email: None,
                display_name: None,
            })
        }
    }

    fn service() -> (AuthService, Authenticator) {
        let config = AuthConfig::with_secret("auth-service-test-secret-00000000001");
        let credentials: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
        let revocations: Arc<dyn RevocationStore> = Arc::new(CacheRevocationStore::new(
            Arc::new(CacheManager::in_memory()),
        ));
        let decoder = Arc::new(JwtDecoder::new(&config));
        let encoder = Arc::new(JwtEncoder::new(&config));
        let authenticator =
            Authenticator::new(decoder.clone(), revocations.clone(), credentials.clone());
        let sessions =
            SessionControl::new(credentials.clone(), revocations, decoder, encoder.clone());

        let service = AuthService::new(
            credentials,
            PasswordChangeGuard::from_config(&config),
            encoder,
            authenticator.clone(),
            sessions,
            IdentityProviders::new().with(Arc::new(FakeGoogle)),
        );
        (service, authenticator)
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (service, authenticator) = service();
        let registered = service
            .register("dave@example.com", "hunter22", UserRole::User)
            .await
            .unwrap();
        assert!(
            authenticator
                .authenticate(&registered.tokens.access_token)
                .await
                .is_ok()
        );

        let logged_in = service.login("DAVE@example.com", "hunter22").await.unwrap();
        assert_eq!(logged_in.credential.id, registered.credential.id);
    }

    #[tokio::test]
    async fn test_bad_login_is_generic() {
        let (service, _) = service();
        service
            .register("erin@example.com", "right", UserRole::User)
            .await
            .unwrap();

        for (email, password) in [("erin@example.com", "wrong"), ("nobody@example.com", "x")] {
            let err = service.login(email, password).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Authentication);
            assert_eq!(err.message, "Incorrect email or password");
        }
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let (service, _) = service();
        service
            .register("fay@example.com", "pw", UserRole::User)
            .await
            .unwrap();
        let err = service
            .register("fay@example.com", "pw", UserRole::User)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_refresh_requires_refresh_token() {
        let (service, authenticator) = service();
        let signed = service
            .register("gus@example.com", "pw", UserRole::User)
            .await
            .unwrap();

        let access = service.refresh(&signed.tokens.refresh_token).await.unwrap();
        assert!(authenticator.authenticate(&access.token).await.is_ok());

        let err = service
            .refresh(&signed.tokens.access_token)
            .await
            .unwrap_err();
        assert_eq!(err.message, "Invalid refresh token. Please log in again.");
    }

    #[tokio::test]
    async fn test_logout_revokes_both_tokens() {
        let (service, authenticator) = service();
        let signed = service
            .register("hal@example.com", "pw", UserRole::User)
            .await
            .unwrap();
        let principal = Principal::new(signed.credential.id.clone(), UserRole::User);

        service
            .logout(
                &principal,
                &signed.tokens.access_token,
                Some(&signed.tokens.refresh_token),
            )
            .await
            .unwrap();

        assert!(matches!(
            authenticator.authenticate(&signed.tokens.access_token).await,
            Err(AuthError::TokenRevoked)
        ));
        assert!(service.refresh(&signed.tokens.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_logout_with_bad_refresh_keeps_access_token() {
        let (service, authenticator) = service();
        let signed = service
            .register("jan@example.com", "pw", UserRole::User)
            .await
            .unwrap();
        let other = service
            .register("kim@example.com", "pw", UserRole::User)
            .await
            .unwrap();
        let principal = Principal::new(signed.credential.id.clone(), UserRole::User);

        assert!(
            service
                .logout(&principal, &signed.tokens.access_token, Some("garbage"))
                .await
                .is_err()
        );
        assert!(
            service
                .logout(
                    &principal,
                    &signed.tokens.access_token,
                    Some(&other.tokens.refresh_token),
                )
                .await
                .is_err()
        );
        assert!(
            service
                .logout(
                    &principal,
                    &signed.tokens.access_token,
                    Some(&signed.tokens.access_token),
                )
                .await
                .is_err()
        );

        assert!(
            authenticator
                .authenticate(&signed.tokens.access_token)
                .await
                .is_ok()
        );
        assert!(service.refresh(&other.tokens.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_rejects_old_tokens() {
        let (service, authenticator) = service();
        let signed = service
            .register("ivy@example.com", "old-pw", UserRole::User)
            .await
            .unwrap();
        let principal = Principal::new(signed.credential.id.clone(), UserRole::User);

        let err = service
            .change_password(&principal, "not-it", "new-pw")
            .await
            .unwrap_err();
        assert_eq!(err.message, "Your current password is wrong.");

        tokio::time::sleep(std::time::Duration::from_millis(2100)).await;
        let fresh = service
            .change_password(&principal, "old-pw", "new-pw")
            .await
            .unwrap();

        assert!(authenticator.authenticate(&fresh.access_token).await.is_ok());
        assert!(matches!(
            authenticator.authenticate(&signed.tokens.access_token).await,
            Err(AuthError::PasswordChanged)
        ));
        assert!(service.login("ivy@example.com", "new-pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_sign_in_with_provider() {
        let (service, _) = service();
        let first = service
            .sign_in_with(IdentityProviderKind::Google, "abc")
            .await
            .unwrap();
        let again = service
            .sign_in_with(IdentityProviderKind::Google, "abc")
            .await
            .unwrap();
        assert_eq!(first.credential.id, again.credential.id);
        assert_eq!(first.credential.google_id.as_deref(), Some("g-abc"));

        let err = service
            .sign_in_with(IdentityProviderKind::Apple, "abc")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
