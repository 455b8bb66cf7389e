//! Token kinds and revocation entries.

pub mod kind;
pub mod revocation;

pub use kind::TokenKind;
pub use revocation::RevocationEntry;
