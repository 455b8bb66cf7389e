//! External identity provider linking.

pub mod linker;
pub mod provider;

pub use linker::IdentityLinker;
pub use provider::{IdentityProvider, IdentityProviders};
