//! Identity provider capability.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_entity::identity::{ExternalProfile, IdentityProviderKind};

/// Exchanges an authorization code for the identity it asserts.
///
/// Network and token-exchange details live in the implementor; the core
/// only consumes the resulting [`ExternalProfile`].
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Which provider this is.
    fn kind(&self) -> IdentityProviderKind;

    /// Exchange an authorization code for a profile.
    async fn exchange(&self, code: &str) -> AppResult<ExternalProfile>;
}

/// Registered providers keyed by kind.
#[derive(Debug, Clone, Default)]
pub struct IdentityProviders {
    providers: HashMap<IdentityProviderKind, Arc<dyn IdentityProvider>>,
}

impl IdentityProviders {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider under its own kind.
    pub fn with(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    /// Looks up a provider.
    pub fn get(&self, kind: IdentityProviderKind) -> AppResult<Arc<dyn IdentityProvider>> {
        self.providers.get(&kind).cloned().ok_or_else(|| {
            AppError::not_found(format!("Identity provider '{kind}' is not configured"))
        })
    }
}
