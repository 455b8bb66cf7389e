//! Repository implementations for the trust-and-access tables.

pub mod credential;
pub mod ownership;
pub mod revocation;
pub mod role;

pub use credential::CredentialRepository;
pub use ownership::OwnershipRepository;
pub use revocation::RevocationRepository;
pub use role::RoleRepository;
