//! # bazaar-api
//!
//! HTTP surface of the trust-and-access core, built on Axum.
//!
//! Provides the bearer-token extractor, permission guards, error mapping,
//! and the auth, session-control, and admin endpoints.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use error::ApiError;
pub use state::AppState;
