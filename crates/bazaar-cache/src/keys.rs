//! Cache key builders for all Bazaar cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Namespace for revocation entries.
const REVOKED: &str = "revoked";

/// Cache key for the revocation entry of a token digest.
///
/// The subject is part of the key so that entries can be counted per
/// subject with a prefix scan.
pub fn revoked_token(user_id: &str, token_hash: &str) -> String {
    format!("{REVOKED}:{user_id}:{token_hash}")
}

/// Cache key used for O(1) lookup by token digest alone.
pub fn revoked_lookup(token_hash: &str) -> String {
    format!("{REVOKED}:by-token:{token_hash}")
}

/// Prefix matching every revocation entry of a subject.
pub fn revoked_subject_prefix(user_id: &str) -> String {
    format!("{REVOKED}:{user_id}:")
}
