//! Permission and role models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Permission name granting every resource/action pair.
pub const WILDCARD_PERMISSION: &str = "*";

/// A named permission, `"<resource>.<action>"` by convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, FromRow)]
pub struct Permission {
    /// Full permission name.
    pub name: String,
    /// Resource type tag, e.g. `advertisement`.
    pub resource: String,
    /// Action, e.g. `update`.
    pub action: String,
}

impl Permission {
    /// Builds a permission from its resource and action.
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        let resource = resource.into();
        let action = action.into();
        Self {
            name: format!("{resource}.{action}"),
            resource,
            action,
        }
    }

    /// The universal grant.
    pub fn wildcard() -> Self {
        Self {
            name: WILDCARD_PERMISSION.to_string(),
            resource: WILDCARD_PERMISSION.to_string(),
            action: WILDCARD_PERMISSION.to_string(),
        }
    }

    /// Parses `"<resource>.<action>"` or `"*"`.
    pub fn parse(name: &str) -> Option<Self> {
        if name == WILDCARD_PERMISSION {
            return Some(Self::wildcard());
        }
        let (resource, action) = name.split_once('.')?;
        if resource.is_empty() || action.is_empty() {
            return None;
        }
        Some(Self::new(resource, action))
    }

    /// Whether this is the universal grant.
    pub fn is_wildcard(&self) -> bool {
        self.name == WILDCARD_PERMISSION
    }
}

/// A role and the permission names it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Role name, matching [`crate::UserRole::as_str`] for built-in roles.
    pub name: String,
    /// Granted permission names.
    pub permissions: BTreeSet<String>,
}

impl RoleDefinition {
    /// Creates a role from a list of permission names.
    pub fn new<I, S>(name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the role holds the universal grant.
    pub fn has_wildcard(&self) -> bool {
        self.permissions.contains(WILDCARD_PERMISSION)
    }
}
