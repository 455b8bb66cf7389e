//! Revocation (negative list) repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;
use bazaar_entity::token::RevocationEntry;

/// Repository for the `token_revocations` table.
#[derive(Debug, Clone)]
pub struct RevocationRepository {
    pool: PgPool,
}

impl RevocationRepository {
    /// Create a new revocation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an entry. Returns `false` when the token was already listed.
    pub async fn insert(&self, entry: &RevocationEntry) -> AppResult<bool> {
        let result = sqlx::query(
            r#"INSERT INTO token_revocations (token, user_id, token_type, expires_at)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (token) DO NOTHING"#,
        )
        .bind(&entry.token)
        .bind(&entry.user_id)
        .bind(entry.kind)
        .bind(entry.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record token revocation", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether a still-relevant entry exists for the token digest.
    pub async fn exists_active(&self, token: &str, now: DateTime<Utc>) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM token_revocations WHERE token = $1 AND expires_at > $2)",
        )
        .bind(token)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check token revocation", e)
        })
    }

    /// Count unexpired entries belonging to a subject.
    pub async fn count_active_for_user(&self, user_id: &str, now: DateTime<Utc>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM token_revocations WHERE user_id = $1 AND expires_at > $2",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count token revocations", e)
        })?;
        Ok(count.max(0) as u64)
    }

    /// Delete entries whose token has expired.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM token_revocations WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to prune expired revocations",
                    e,
                )
            })?;
        Ok(result.rows_affected())
    }
}
