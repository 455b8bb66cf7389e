//! Core traits defined in `bazaar-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
