//! Token signature and expiry verification.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use bazaar_core::config::AuthConfig;

use super::claims::Claims;
use crate::error::{AuthError, AuthResult};

/// Verifies tokens against the current secret and any previous secrets.
#[derive(Clone)]
pub struct JwtDecoder {
    /// Current key first, then rotated-out keys.
    decoding_keys: Vec<DecodingKey>,
    /// Validation configuration. Expiry is checked separately so that a
    /// bad signature is always reported before an elapsed `exp`.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("keys", &self.decoding_keys.len())
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let decoding_keys = std::iter::once(&config.jwt_secret)
            .chain(config.jwt_previous_secrets.iter())
            .map(|secret| DecodingKey::from_secret(secret.as_bytes()))
            .collect();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        if let Some(issuer) = &config.jwt_issuer {
            validation.set_issuer(&[issuer]);
            validation.set_required_spec_claims(&["exp", "iss"]);
        }

        Self {
            decoding_keys,
            validation,
        }
    }

    /// Verifies the signature and expiry of a token.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let claims = self.decode_signed(token)?;
        if claims.is_expired_at(Utc::now()) {
            debug!(subject = %claims.id, exp = claims.exp, "Rejected expired token");
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }

    /// Verifies the signature only, returning claims even if expired.
    pub fn decode_signed(&self, token: &str) -> AuthResult<Claims> {
        for key in &self.decoding_keys {
            match decode::<Claims>(token, key, &self.validation) {
                Ok(data) => return Ok(data.claims),
                Err(e) if *e.kind() == jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    continue;
                }
                Err(e) => {
                    debug!(error = %e, "Rejected malformed token");
                    return Err(AuthError::TokenInvalid);
                }
            }
        }
        debug!("Rejected token with invalid signature");
        Err(AuthError::TokenInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use bazaar_entity::token::TokenKind;

    const SECRET: &str = "test-secret-that-is-long-enough-0001";

    fn config() -> AuthConfig {
        AuthConfig::with_secret(SECRET)
    }

    #[test]
    fn test_round_trip_returns_subject() {
        let encoder = JwtEncoder::new(&config());
        let decoder = JwtDecoder::new(&config());

        let issued = encoder
            .issue("u1", TokenKind::Access, chrono::Duration::minutes(15))
            .unwrap();
        let claims = decoder.verify(&issued.token).unwrap();

        assert_eq!(claims.id, "u1");
        assert_eq!(claims.typ, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        let encoder = JwtEncoder::new(&config());
        let decoder = JwtDecoder::new(&config());

        let issued = encoder
            .issue_at(
                "u1",
                TokenKind::Access,
                Utc::now() - chrono::Duration::minutes(20),
                chrono::Duration::minutes(15),
            )
            .unwrap();

        assert!(matches!(
            decoder.verify(&issued.token),
            Err(AuthError::TokenExpired)
        ));
        assert_eq!(decoder.decode_signed(&issued.token).unwrap().id, "u1");
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let other = JwtEncoder::new(&AuthConfig::with_secret(
            "a-completely-different-secret-value",
        ));
        let decoder = JwtDecoder::new(&config());

        let issued = other
            .issue_at(
                "u1",
                TokenKind::Access,
                Utc::now() - chrono::Duration::hours(2),
                chrono::Duration::minutes(15),
            )
            .unwrap();

        assert!(matches!(
            decoder.verify(&issued.token),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn test_garbled_token_rejected() {
        let decoder = JwtDecoder::new(&config());
        assert!(matches!(
            decoder.verify("not.a.token"),
            Err(AuthError::TokenInvalid)
        ));
        assert!(matches!(decoder.verify(""), Err(AuthError::TokenInvalid)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let encoder = JwtEncoder::new(&config());
        let decoder = JwtDecoder::new(&config());
        let a = encoder.issue_default("u1", TokenKind::Access).unwrap().token;
        let b = encoder.issue_default("u2", TokenKind::Access).unwrap().token;

        let a_parts: Vec<&str> = a.split('.').collect();
        let b_parts: Vec<&str> = b.split('.').collect();
        let forged = format!("{}.{}.{}", a_parts[0], b_parts[1], a_parts[2]);

        assert!(matches!(
            decoder.verify(&forged),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn test_previous_secret_still_verifies() {
        let old = "the-previous-secret-still-in-rotation";
        let old_encoder = JwtEncoder::new(&AuthConfig::with_secret(old));
        let mut rotated = config();
        rotated.jwt_previous_secrets = vec![old.to_string()];
        let decoder = JwtDecoder::new(&rotated);

        let issued = old_encoder.issue_default("u1", TokenKind::Access).unwrap();
        assert_eq!(decoder.verify(&issued.token).unwrap().id, "u1");
    }

    #[test]
    fn test_same_second_tokens_are_distinct() {
        let encoder = JwtEncoder::new(&config());
        let now = Utc::now();
        let ttl = chrono::Duration::minutes(15);
        let a = encoder.issue_at("u1", TokenKind::Access, now, ttl).unwrap();
        let b = encoder.issue_at("u1", TokenKind::Access, now, ttl).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_issuer_is_enforced() {
        let mut with_issuer = config();
        with_issuer.jwt_issuer = Some("bazaar".to_string());
        let decoder = JwtDecoder::new(&with_issuer);

        let plain = JwtEncoder::new(&config())
            .issue_default("u1", TokenKind::Access)
            .unwrap();
        assert!(matches!(
            decoder.verify(&plain.token),
            Err(AuthError::TokenInvalid)
        ));

        let stamped = JwtEncoder::new(&with_issuer)
            .issue_default("u1", TokenKind::Access)
            .unwrap();
        assert!(decoder.verify(&stamped.token).is_ok());
    }
}
