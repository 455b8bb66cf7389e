//! Permissions and role definitions.

pub mod model;

pub use model::{Permission, RoleDefinition, WILDCARD_PERMISSION};
