//! Credential records and roles.

pub mod credential;
pub mod role;

pub use credential::{Credential, NewCredential};
pub use role::UserRole;
