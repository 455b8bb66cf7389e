//! Ownership lookup dispatch, keyed by resource type.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::warn;

use bazaar_core::result::AppResult;
use bazaar_database::DatabasePool;
use bazaar_database::repositories::OwnershipRepository;

/// Resolves the owner of a resource instance. Implemented by the domain
/// module that owns the resource type.
#[async_trait]
pub trait OwnershipLookup: Send + Sync + std::fmt::Debug + 'static {
    /// Owner id of the resource, `None` if it does not exist.
    async fn owner_of(&self, resource_id: &str) -> AppResult<Option<String>>;
}

/// A resource that is its own owner (`user` records).
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfOwnership;

#[async_trait]
impl OwnershipLookup for SelfOwnership {
    async fn owner_of(&self, resource_id: &str) -> AppResult<Option<String>> {
        Ok(Some(resource_id.to_string()))
    }
}

/// Owner table held in memory.
#[derive(Debug, Default)]
pub struct MemoryOwnership {
    owners: DashMap<String, String>,
}

impl MemoryOwnership {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `owner_id` as owner of `resource_id`.
    pub fn set_owner(&self, resource_id: impl Into<String>, owner_id: impl Into<String>) {
        self.owners.insert(resource_id.into(), owner_id.into());
    }
}

#[async_trait]
impl OwnershipLookup for MemoryOwnership {
    async fn owner_of(&self, resource_id: &str) -> AppResult<Option<String>> {
        Ok(self.owners.get(resource_id).map(|owner| owner.clone()))
    }
}

/// Owner column of a domain table.
#[derive(Debug, Clone)]
pub struct DatabaseOwnership {
    repo: OwnershipRepository,
}

impl DatabaseOwnership {
    /// Wraps an ownership repository.
    pub fn new(repo: OwnershipRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl OwnershipLookup for DatabaseOwnership {
    async fn owner_of(&self, resource_id: &str) -> AppResult<Option<String>> {
        self.repo.find_owner(resource_id).await
    }
}

/// Dispatch table from resource type to its ownership lookup.
///
/// Unknown resource types are never owned.
#[derive(Debug, Clone)]
pub struct OwnershipRegistry {
    lookups: HashMap<String, Arc<dyn OwnershipLookup>>,
}

impl OwnershipRegistry {
    /// Creates a registry with the built-in `user → id` rule.
    pub fn new() -> Self {
        Self::empty().with("user", Arc::new(SelfOwnership))
    }

    /// A registry with no lookups at all.
    pub fn empty() -> Self {
        Self {
            lookups: HashMap::new(),
        }
    }

    /// Registers the lookup for a resource type.
    pub fn with(mut self, resource: impl Into<String>, lookup: Arc<dyn OwnershipLookup>) -> Self {
        self.lookups.insert(resource.into(), lookup);
        self
    }

    /// Registers the marketplace tables: `profile → profiles.owner`,
    /// `advertisement → advertisements.owner_id`,
    /// `application → applications.applicant_id`.
    pub fn with_database_defaults(self, db: &DatabasePool) -> Self {
        let pool = db.pool();
        self.with(
            "profile",
            Arc::new(DatabaseOwnership::new(OwnershipRepository::new(
                pool.clone(),
                "profiles",
                "owner",
            ))),
        )
        .with(
            "advertisement",
            Arc::new(DatabaseOwnership::new(OwnershipRepository::new(
                pool.clone(),
                "advertisements",
                "owner_id",
            ))),
        )
        .with(
            "application",
            Arc::new(DatabaseOwnership::new(OwnershipRepository::new(
                pool.clone(),
                "applications",
                "applicant_id",
            ))),
        )
    }

    /// Whether `principal_id` owns `resource_id` of type `resource`.
    pub async fn is_owner(
        &self,
        resource: &str,
        resource_id: &str,
        principal_id: &str,
    ) -> AppResult<bool> {
        let Some(lookup) = self.lookups.get(resource) else {
            warn!(resource = %resource, "No ownership lookup registered, treating as not owner");
            return Ok(false);
        };

        let owner = lookup.owner_of(resource_id).await?;
        Ok(owner.as_deref() == Some(principal_id))
    }
}

impl Default for OwnershipRegistry {
    fn default() -> Self {
        Self::new()
    }
}
