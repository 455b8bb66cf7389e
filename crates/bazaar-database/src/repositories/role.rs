//! Role and permission catalog repository.

use sqlx::PgPool;

use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;
use bazaar_entity::permission::{Permission, RoleDefinition};

/// Repository for the `roles`, `permissions` and `role_permissions` tables.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load a role with its granted permission names.
    pub async fn find_role(&self, name: &str) -> AppResult<Option<RoleDefinition>> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roles WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role", e))?;

        if !exists {
            return Ok(None);
        }

        let permissions: Vec<String> = sqlx::query_scalar(
            "SELECT permission_name FROM role_permissions WHERE role_name = $1",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load role permissions", e)
        })?;

        Ok(Some(RoleDefinition::new(name, permissions)))
    }

    /// Look up a catalog permission by resource and action.
    pub async fn find_permission(
        &self,
        resource: &str,
        action: &str,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT name, resource, action FROM permissions WHERE resource = $1 AND action = $2",
        )
        .bind(resource)
        .bind(action)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find permission", e))
    }
}
