//! Negative list of explicitly invalidated tokens.

pub mod cache;
pub mod database;
pub mod store;
pub mod sweeper;

pub use cache::CacheRevocationStore;
pub use database::DatabaseRevocationStore;
pub use store::{RevocationStatus, RevocationStore, token_digest};
pub use sweeper::RevocationSweeper;
