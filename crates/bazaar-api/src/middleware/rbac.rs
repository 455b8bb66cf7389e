//! Permission guards for handlers.
//!
//! Domain handlers call these with the extracted [`AuthUser`] before doing
//! any work; the first failing check ends the request.

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

use bazaar_auth::PermissionEngine;

/// Requires the admin role.
pub fn require_admin(auth: &AuthUser) -> Result<(), ApiError> {
    Ok(PermissionEngine::require_admin(Some(&auth.principal))?)
}

/// Requires the moderator or admin role.
pub fn require_moderator_or_admin(auth: &AuthUser) -> Result<(), ApiError> {
    Ok(PermissionEngine::require_moderator_or_admin(Some(
        &auth.principal,
    ))?)
}

/// Requires every listed permission.
pub async fn require_permissions(
    state: &AppState,
    auth: &AuthUser,
    required: &[&str],
) -> Result<(), ApiError> {
    Ok(state
        .permissions
        .require_permissions(Some(&auth.principal), required)
        .await?)
}

/// Requires `<resource>.<action>` and, for update/delete of a specific
/// instance, ownership or a privileged role.
pub async fn require_resource_permission(
    state: &AppState,
    auth: &AuthUser,
    resource: &str,
    action: &str,
    resource_id: Option<&str>,
) -> Result<(), ApiError> {
    Ok(state
        .permissions
        .check_resource_permission(Some(&auth.principal), resource, action, resource_id)
        .await?)
}
