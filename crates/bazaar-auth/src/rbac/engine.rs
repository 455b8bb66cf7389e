//! Permission resolution: required-permission and ownership checks.

use std::sync::Arc;

use tracing::debug;

use bazaar_entity::permission::RoleDefinition;
use bazaar_entity::user::UserRole;

use super::ownership::OwnershipRegistry;
use super::policies::RoleStore;
use crate::error::{AuthError, AuthResult};
use crate::principal::Principal;

/// Evaluates an endpoint's declared requirement against a principal.
///
/// Every check short-circuits on the first failure.
#[derive(Debug, Clone)]
pub struct PermissionEngine {
    roles: Arc<dyn RoleStore>,
    ownership: OwnershipRegistry,
}

/// Actions that additionally require ownership or a privileged role.
fn is_owner_scoped(action: &str) -> bool {
    matches!(action, "update" | "delete")
}

impl PermissionEngine {
    /// Creates an engine over a role store and ownership dispatch table.
    pub fn new(roles: Arc<dyn RoleStore>, ownership: OwnershipRegistry) -> Self {
        Self { roles, ownership }
    }

    async fn resolve_role(&self, principal: &Principal) -> AuthResult<RoleDefinition> {
        self.roles
            .role(principal.role.as_str())
            .await
            .map_err(|e| AuthError::store_fault(&principal.id, e))?
            .ok_or_else(|| {
                debug!(subject = %principal.id, role = %principal.role, "Role missing from store");
                AuthError::RoleNotFound
            })
    }

    /// Passes iff the principal's role holds every permission in
    /// `required`, or holds `"*"`.
    pub async fn require_permissions(
        &self,
        principal: Option<&Principal>,
        required: &[&str],
    ) -> AuthResult<()> {
        let principal = principal.ok_or(AuthError::Unauthenticated)?;
        let role = self.resolve_role(principal).await?;

        if role.has_wildcard() {
            return Ok(());
        }

        match required.iter().find(|p| !role.permissions.contains(**p)) {
            Some(missing) => {
                debug!(subject = %principal.id, permission = %missing, "Permission denied");
                Err(AuthError::InsufficientPermission)
            }
            None => Ok(()),
        }
    }

    /// Checks `<resource>.<action>` and, for update/delete on a specific
    /// instance, that the principal owns it or is a moderator/admin.
    pub async fn check_resource_permission(
        &self,
        principal: Option<&Principal>,
        resource: &str,
        action: &str,
        resource_id: Option<&str>,
    ) -> AuthResult<()> {
        let principal = principal.ok_or(AuthError::Unauthenticated)?;
        let role = self.resolve_role(principal).await?;

        if role.has_wildcard() {
            return Ok(());
        }

        let required = format!("{resource}.{action}");
        let known = self
            .roles
            .permission_exists(resource, action)
            .await
            .map_err(|e| AuthError::store_fault(&principal.id, e))?;
        if !known {
            debug!(permission = %required, "Permission missing from catalog");
            return Err(AuthError::PermissionNotFound);
        }

        if !role.permissions.contains(&required) {
            debug!(subject = %principal.id, permission = %required, "Permission denied");
            return Err(AuthError::InsufficientPermission);
        }

        let Some(resource_id) = resource_id else {
            return Ok(());
        };
        if !is_owner_scoped(action) || principal.role.is_moderator_or_admin() {
            return Ok(());
        }

        let owns = self
            .ownership
            .is_owner(resource, resource_id, &principal.id)
            .await
            .map_err(|e| AuthError::store_fault(&principal.id, e))?;
        if owns {
            Ok(())
        } else {
            debug!(
                subject = %principal.id,
                resource = %resource,
                resource_id = %resource_id,
                "Ownership check failed"
            );
            Err(AuthError::InsufficientPermission)
        }
    }

    /// Admin fast path.
    pub fn is_admin(role: UserRole) -> bool {
        role.is_admin()
    }

    /// Moderator-or-admin fast path.
    pub fn is_moderator_or_admin(role: UserRole) -> bool {
        role.is_moderator_or_admin()
    }

    /// Coarse gate for admin-only operations.
    pub fn require_admin(principal: Option<&Principal>) -> AuthResult<()> {
        let principal = principal.ok_or(AuthError::Unauthenticated)?;
        if Self::is_admin(principal.role) {
            Ok(())
        } else {
            Err(AuthError::AdminRequired)
        }
    }

    /// Coarse gate for moderation operations.
    pub fn require_moderator_or_admin(principal: Option<&Principal>) -> AuthResult<()> {
        let principal = principal.ok_or(AuthError::Unauthenticated)?;
        if Self::is_moderator_or_admin(principal.role) {
            Ok(())
        } else {
            Err(AuthError::ModeratorRequired)
        }
    }
}
