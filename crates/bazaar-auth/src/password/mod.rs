//! Password hashing and the change watermark.

pub mod guard;
pub mod hasher;

pub use guard::PasswordChangeGuard;
pub use hasher::PasswordHasher;
