//! Role catalog over the `roles`/`permissions` tables.

use async_trait::async_trait;

use bazaar_core::result::AppResult;
use bazaar_database::repositories::RoleRepository;
use bazaar_entity::permission::RoleDefinition;

use super::policies::RoleStore;

/// PostgreSQL-backed role store. Reads are not cached, so catalog edits
/// take effect on the next check.
#[derive(Debug, Clone)]
pub struct DatabaseRoleStore {
    repo: RoleRepository,
}

impl DatabaseRoleStore {
    /// Wraps a role repository.
    pub fn new(repo: RoleRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl RoleStore for DatabaseRoleStore {
    async fn role(&self, name: &str) -> AppResult<Option<RoleDefinition>> {
        self.repo.find_role(name).await
    }

    async fn permission_exists(&self, resource: &str, action: &str) -> AppResult<bool> {
        Ok(self.repo.find_permission(resource, action).await?.is_some())
    }
}
