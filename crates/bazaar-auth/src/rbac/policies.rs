//! Role-to-permission catalog.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use bazaar_core::result::AppResult;
use bazaar_entity::permission::{RoleDefinition, WILDCARD_PERMISSION};

/// Source of role definitions and the permission catalog.
#[async_trait]
pub trait RoleStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load a role by name.
    async fn role(&self, name: &str) -> AppResult<Option<RoleDefinition>>;

    /// Whether `<resource>.<action>` is a known permission.
    async fn permission_exists(&self, resource: &str, action: &str) -> AppResult<bool>;
}

/// Resources the marketplace authorizes against.
const RESOURCES: &[&str] = &[
    "profile",
    "advertisement",
    "category",
    "tag",
    "chat",
    "review",
    "application",
    "user",
];

const CRUD: &[&str] = &["create", "read", "update", "delete"];

const USER_PERMISSIONS: &[&str] = &[
    "profile.create",
    "profile.read",
    "profile.update",
    "profile.delete",
    "advertisement.create",
    "advertisement.read",
    "advertisement.update",
    "advertisement.delete",
    "category.read",
    "tag.read",
    "chat.create",
    "chat.read",
    "review.create",
    "review.read",
    "review.update",
    "review.delete",
    "application.create",
    "application.read",
    "application.update",
    "application.delete",
    "user.read",
    "user.update",
];

const MODERATOR_EXTRA: &[&str] = &[
    "advertisement.moderate",
    "review.moderate",
    "user.moderate",
    "category.create",
    "category.update",
    "tag.create",
    "tag.update",
];

/// In-memory role catalog.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    /// Role name → definition.
    roles: HashMap<String, RoleDefinition>,
    /// Known permission names.
    catalog: BTreeSet<String>,
}

impl RbacPolicies {
    /// Creates the default marketplace catalog: `admin` holds `"*"`,
    /// `moderator` extends `user`.
    pub fn new() -> Self {
        let mut catalog: BTreeSet<String> = RESOURCES
            .iter()
            .flat_map(|resource| CRUD.iter().map(move |action| format!("{resource}.{action}")))
            .collect();
        catalog.extend(MODERATOR_EXTRA.iter().map(|p| p.to_string()));

        let user = RoleDefinition::new("user", USER_PERMISSIONS.iter().copied());
        let moderator = RoleDefinition::new(
            "moderator",
            USER_PERMISSIONS.iter().chain(MODERATOR_EXTRA).copied(),
        );
        let admin = RoleDefinition::new("admin", [WILDCARD_PERMISSION]);

        Self::empty()
            .with_catalog(catalog)
            .with_role(user)
            .with_role(moderator)
            .with_role(admin)
    }

    /// A catalog with no roles and no permissions.
    pub fn empty() -> Self {
        Self {
            roles: HashMap::new(),
            catalog: BTreeSet::new(),
        }
    }

    /// Adds (or replaces) a role. Its permissions join the catalog.
    pub fn with_role(mut self, role: RoleDefinition) -> Self {
        self.catalog.extend(
            role.permissions
                .iter()
                .filter(|p| p.as_str() != WILDCARD_PERMISSION)
                .cloned(),
        );
        self.roles.insert(role.name.clone(), role);
        self
    }

    /// Adds permission names to the catalog.
    pub fn with_catalog<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catalog.extend(permissions.into_iter().map(Into::into));
        self
    }

    /// Looks up a role definition.
    pub fn get(&self, name: &str) -> Option<&RoleDefinition> {
        self.roles.get(name)
    }

    /// Whether the permission name is in the catalog.
    pub fn contains_permission(&self, name: &str) -> bool {
        self.catalog.contains(name)
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleStore for RbacPolicies {
    async fn role(&self, name: &str) -> AppResult<Option<RoleDefinition>> {
        Ok(self.roles.get(name).cloned())
    }

    async fn permission_exists(&self, resource: &str, action: &str) -> AppResult<bool> {
        Ok(self.contains_permission(&format!("{resource}.{action}")))
    }
}
