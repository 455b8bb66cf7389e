//! Authentication and authorization failures.
//!
//! The `Display` text of each variant is the message returned to clients
//! and is relied upon verbatim by callers.

use thiserror::Error;
use tracing::error;

use bazaar_core::error::{AppError, ErrorKind};

/// Failure taxonomy of the trust-and-access core.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token, or a malformed `Authorization` header.
    #[error("You are not logged in! Please log in to get access.")]
    Unauthenticated,
    /// Signature mismatch, garbled token, or wrong token kind.
    #[error("Invalid token. Please log in again.")]
    TokenInvalid,
    /// `exp` is in the past.
    #[error("Token has expired. Please log in again.")]
    TokenExpired,
    /// The token is on the revocation list.
    #[error("Token has been invalidated. Please log in again.")]
    TokenRevoked,
    /// The token predates the credential's `password_changed_at` watermark.
    #[error("User recently changed password! Please log in again.")]
    PasswordChanged,
    /// The subject named by the token no longer has a credential record.
    #[error("The user belonging to this token no longer exists.")]
    SubjectNotFound,
    /// The account an operation targets does not exist.
    #[error("No user found with that ID")]
    UserNotFound,
    /// A refresh token failed verification.
    #[error("Invalid refresh token. Please log in again.")]
    RefreshInvalid,
    /// Unknown email or wrong password at login.
    #[error("Incorrect email or password")]
    InvalidCredentials,
    /// The current password given to a password change did not match.
    #[error("Your current password is wrong.")]
    IncorrectPassword,
    /// The principal's role is missing from the role store.
    #[error("Role not found")]
    RoleNotFound,
    /// A constructed permission name is missing from the catalog.
    #[error("Permission not found")]
    PermissionNotFound,
    /// Missing permission or failed ownership check.
    #[error("Insufficient permissions to perform this action")]
    InsufficientPermission,
    /// Admin-only operation.
    #[error("Administrative access required")]
    AdminRequired,
    /// Moderator-or-admin operation.
    #[error("Moderator or administrator access required")]
    ModeratorRequired,
    /// Attempt to revoke another subject's token without privilege.
    #[error("You can only revoke your own tokens")]
    ForeignToken,
    /// A store or lookup fault. The cause is logged, never shown.
    #[error("Error checking permissions. Please try again later.")]
    AccessControl(#[source] AppError),
}

/// Result alias for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Wraps a store fault, logging it with the identifier being checked.
    pub fn store_fault(subject: &str, err: AppError) -> Self {
        error!(subject = %subject, error = %err, "Access control store fault");
        Self::AccessControl(err)
    }

    /// Like [`AuthError::store_fault`], but a missing target account is
    /// reported as [`AuthError::UserNotFound`].
    pub fn target_fault(target: &str, err: AppError) -> Self {
        if err.kind == ErrorKind::NotFound {
            Self::UserNotFound
        } else {
            Self::store_fault(target, err)
        }
    }

    /// The application error kind (and thereby HTTP status) of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated
            | Self::TokenInvalid
            | Self::TokenExpired
            | Self::TokenRevoked
            | Self::PasswordChanged
            | Self::SubjectNotFound
            | Self::RefreshInvalid
            | Self::InvalidCredentials
            | Self::IncorrectPassword
            | Self::RoleNotFound => ErrorKind::Authentication,
            Self::PermissionNotFound | Self::UserNotFound => ErrorKind::NotFound,
            Self::InsufficientPermission
            | Self::AdminRequired
            | Self::ModeratorRequired
            | Self::ForeignToken => ErrorKind::Authorization,
            Self::AccessControl(_) => ErrorKind::Internal,
        }
    }

    /// Whether the failure is about the presented token itself rather than
    /// a store fault.
    pub fn is_token_rejection(&self) -> bool {
        !matches!(self, Self::AccessControl(_))
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        error!(error = %err, "Access control store fault");
        Self::AccessControl(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            AuthError::AccessControl(source) => AppError::with_source(kind, message, source),
            _ => AppError::new(kind, message),
        }
    }
}
