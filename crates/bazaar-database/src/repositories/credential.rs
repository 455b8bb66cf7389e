//! Credential repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;
use bazaar_entity::identity::IdentityProviderKind;
use bazaar_entity::user::{Credential, NewCredential};

/// Repository for credential records and their watermark.
#[derive(Debug, Clone)]
pub struct CredentialRepository {
    pool: PgPool,
}

/// Column holding the linked account id for a provider.
fn provider_column(provider: IdentityProviderKind) -> &'static str {
    match provider {
        IdentityProviderKind::Google => "google_id",
        IdentityProviderKind::Facebook => "facebook_id",
        IdentityProviderKind::Apple => "apple_id",
    }
}

impl CredentialRepository {
    /// Create a new credential repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a credential by principal id.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Credential>> {
        sqlx::query_as::<_, Credential>("SELECT * FROM credentials WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find credential by id", e)
            })
    }

    /// Find a credential by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Credential>> {
        sqlx::query_as::<_, Credential>(
            "SELECT * FROM credentials WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find credential by email", e)
        })
    }

    /// Find the credential linked to an external provider account.
    pub async fn find_by_provider(
        &self,
        provider: IdentityProviderKind,
        external_id: &str,
    ) -> AppResult<Option<Credential>> {
        let sql = format!(
            "SELECT * FROM credentials WHERE {} = $1",
            provider_column(provider)
        );
        sqlx::query_as::<_, Credential>(&sql)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to find credential by provider",
                    e,
                )
            })
    }

    /// Insert a new credential with a generated id.
    pub async fn create(&self, data: &NewCredential) -> AppResult<Credential> {
        let id = Uuid::new_v4().simple().to_string();
        sqlx::query_as::<_, Credential>(
            r#"INSERT INTO credentials (id, email, password_hash, role)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(&id)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db) = e {
                if db.is_unique_violation() {
                    return AppError::conflict(format!(
                        "An account with email '{}' already exists",
                        data.email
                    ));
                }
            }
            AppError::with_source(ErrorKind::Database, "Failed to create credential", e)
        })
    }

    /// Replace the password hash and move the watermark in one statement.
    pub async fn update_password(
        &self,
        id: &str,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"UPDATE credentials
               SET password_hash = $2, password_changed_at = $3,
                   must_change_password = FALSE, updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(changed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update password", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Move the watermark without touching the password.
    pub async fn set_password_changed_at(
        &self,
        id: &str,
        changed_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE credentials SET password_changed_at = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(changed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update password watermark", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    /// Set or clear the forced-password-change flag.
    pub async fn set_must_change_password(&self, id: &str, required: bool) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE credentials SET must_change_password = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(required)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to update must_change_password",
                e,
            )
        })?;
        Ok(result.rows_affected() > 0)
    }

    /// Attach an external provider account to an existing credential.
    pub async fn link_provider(
        &self,
        id: &str,
        provider: IdentityProviderKind,
        external_id: &str,
    ) -> AppResult<Credential> {
        let sql = format!(
            "UPDATE credentials SET {} = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
            provider_column(provider)
        );
        sqlx::query_as::<_, Credential>(&sql)
            .bind(id)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to link identity provider", e)
            })?
            .ok_or_else(|| AppError::not_found(format!("Credential {id} not found")))
    }
}
