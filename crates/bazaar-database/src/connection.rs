//! PostgreSQL pool for the credential, revocation and role tables.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{info, warn};

use bazaar_core::config::DatabaseConfig;
use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;

/// Tables the auth core reads on every authenticated request.
pub const REQUIRED_TABLES: [&str; 5] = [
    "credentials",
    "token_revocations",
    "roles",
    "permissions",
    "role_permissions",
];

/// Shared sqlx pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Opens the pool. Only host, port, database and user are logged; the
    /// URL itself never reaches the logs.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = PgConnectOptions::from_str(&config.url).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid database.url", e)
        })?;

        info!(
            host = %options.get_host(),
            port = options.get_port(),
            database = options.get_database().unwrap_or("<default>"),
            user = %options.get_username(),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to connect to database", e)
            })?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Names from [`REQUIRED_TABLES`] that do not resolve in the current
    /// search path.
    pub async fn missing_tables(&self) -> AppResult<Vec<String>> {
        let names: Vec<String> = REQUIRED_TABLES.iter().map(|t| t.to_string()).collect();
        sqlx::query_scalar::<_, String>(
            "SELECT name FROM unnest($1::text[]) AS t(name) WHERE to_regclass(name) IS NULL",
        )
        .bind(&names)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Schema check failed", e))
    }

    /// Healthy when the server answers and every required table exists.
    pub async fn health_check(&self) -> AppResult<bool> {
        let missing = self.missing_tables().await?;
        if !missing.is_empty() {
            warn!(missing = ?missing, "Database is reachable but the auth schema is incomplete");
        }
        Ok(missing.is_empty())
    }
}
