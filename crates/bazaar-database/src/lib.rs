//! # bazaar-database
//!
//! PostgreSQL connection management and concrete repositories for the
//! credential, revocation, and role/permission tables.

pub mod connection;
pub mod migration;
pub mod repositories;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use connection::DatabasePool;
