//! Profile returned by an external identity provider after code exchange.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported external identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProviderKind {
    /// Google OAuth.
    Google,
    /// Facebook Login.
    Facebook,
    /// Sign in with Apple.
    Apple,
}

impl IdentityProviderKind {
    /// Return the provider as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
            Self::Apple => "apple",
        }
    }
}

impl fmt::Display for IdentityProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IdentityProviderKind {
    type Err = bazaar_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "facebook" => Ok(Self::Facebook),
            "apple" => Ok(Self::Apple),
            _ => Err(bazaar_core::AppError::not_found(format!(
                "Unknown identity provider: '{s}'"
            ))),
        }
    }
}

/// The identity asserted by an external provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalProfile {
    /// Which provider asserted the identity.
    pub provider: IdentityProviderKind,
    /// Provider-specific account id.
    pub external_id: String,
    /// Email, when the provider shares one.
    pub email: Option<String>,
    /// Display name, when available.
    pub display_name: Option<String>,
}
