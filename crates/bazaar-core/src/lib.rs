//! # bazaar-core
//!
//! Core crate for the Bazaar trust-and-access layer. Contains the unified
//! error system, configuration schemas, and the cache provider trait that
//! the revocation store is built on.
//!
//! This crate has **no** internal dependencies on other Bazaar crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
