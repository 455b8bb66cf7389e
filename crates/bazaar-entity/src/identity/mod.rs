//! External identity provider models.

pub mod profile;

pub use profile::{ExternalProfile, IdentityProviderKind};
