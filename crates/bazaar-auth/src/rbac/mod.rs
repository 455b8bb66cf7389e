//! Role-based access control with ownership-scoped checks.

pub mod database;
pub mod engine;
pub mod ownership;
pub mod policies;

pub use database::DatabaseRoleStore;
pub use engine::PermissionEngine;
pub use ownership::{
    DatabaseOwnership, MemoryOwnership, OwnershipLookup, OwnershipRegistry, SelfOwnership,
};
pub use policies::{RbacPolicies, RoleStore};
