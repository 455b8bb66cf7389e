//! # bazaar-auth
//!
//! The trust-and-access core of the Bazaar marketplace.
//!
//! ## Modules
//!
//! - `jwt`: signed access/refresh token issuance and verification
//! - `revocation`: the negative list of explicitly invalidated tokens
//! - `password`: Argon2id hashing and the `password_changed_at` watermark guard
//! - `credential`: credential store abstraction (memory and PostgreSQL)
//! - `rbac`: role catalog, permission engine, and ownership dispatch
//! - `session`: compound revocation operations
//! - `identity`: external identity provider linking
//! - `authenticator`: the per-request `authorize` pipeline
//! - `service`: login, registration, refresh, logout, password change

pub mod authenticator;
pub mod credential;
pub mod error;
pub mod identity;
pub mod jwt;
pub mod password;
pub mod principal;
pub mod rbac;
pub mod revocation;
pub mod service;
pub mod session;

pub use authenticator::Authenticator;
pub use credential::{CredentialStore, DatabaseCredentialStore, MemoryCredentialStore};
pub use error::{AuthError, AuthResult};
pub use identity::{IdentityLinker, IdentityProvider, IdentityProviders};
pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenPair};
pub use password::{PasswordChangeGuard, PasswordHasher};
pub use principal::Principal;
pub use rbac::{OwnershipLookup, OwnershipRegistry, PermissionEngine, RbacPolicies, RoleStore};
pub use revocation::{
    CacheRevocationStore, DatabaseRevocationStore, RevocationStatus, RevocationStore,
    RevocationSweeper,
};
pub use service::{AuthService, SignedIn};
pub use session::{ActiveSessions, RevocationOutcome, SessionControl};
