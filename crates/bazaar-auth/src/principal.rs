//! The authenticated identity attached to a request.

use serde::{Deserialize, Serialize};

use bazaar_entity::user::UserRole;

/// Identity and role derived from a verified token. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Subject id.
    pub id: String,
    /// Role read from the credential record at verification time.
    pub role: UserRole,
}

impl Principal {
    /// Creates a principal.
    pub fn new(id: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Admin fast path.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Moderator-or-admin fast path.
    pub fn is_moderator_or_admin(&self) -> bool {
        self.role.is_moderator_or_admin()
    }
}
