//! # bazaar-entity
//!
//! Plain data types shared by the storage, auth and API crates.

pub mod identity;
pub mod permission;
pub mod token;
pub mod user;

pub use identity::{ExternalProfile, IdentityProviderKind};
pub use permission::{Permission, RoleDefinition, WILDCARD_PERMISSION};
pub use token::{RevocationEntry, TokenKind};
pub use user::{Credential, NewCredential, UserRole};
