//! Credential store: password hash, role, and watermark per principal.

pub mod database;
pub mod memory;
pub mod store;

pub use database::DatabaseCredentialStore;
pub use memory::MemoryCredentialStore;
pub use store::CredentialStore;
