//! Compound revocation operations.

pub mod control;

pub use control::{ActiveSessions, RevocationOutcome, SessionControl};
