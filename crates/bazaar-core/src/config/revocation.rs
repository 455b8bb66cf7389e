//! Revocation store configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Where revocation entries are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RevocationBackend {
    /// The configured cache provider (memory or Redis) with native TTL.
    #[default]
    Cache,
    /// The `token_revocations` table in PostgreSQL.
    Database,
}

/// Revocation store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationConfig {
    /// Storage backend for revocation entries.
    #[serde(default)]
    pub backend: RevocationBackend,
    /// Interval between sweeps of expired entries, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            backend: RevocationBackend::default(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

impl RevocationConfig {
    /// Rejects a zero sweep interval, which the sweeper cannot tick on.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.sweep_interval_seconds == 0 {
            return Err(AppError::configuration(
                "revocation.sweep_interval_seconds must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_sweep_interval() -> u64 {
    300
}
