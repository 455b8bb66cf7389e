//! Bazaar Server: trust and access core.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use bazaar_api::{build_app, build_state};
use bazaar_auth::{IdentityProviders, RevocationSweeper};
use bazaar_cache::CacheManager;
use bazaar_core::config::AppConfig;
use bazaar_core::error::AppError;
use bazaar_database::DatabasePool;
use bazaar_database::migration::run_migrations;

#[tokio::main]
async fn main() {
    let env = std::env::var("BAZAAR_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Bazaar v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let database = match &config.database {
        Some(db_config) => {
            let pool = DatabasePool::connect(db_config).await?;
            if db_config.run_migrations {
                run_migrations(pool.pool()).await?;
            } else {
                tracing::info!("Skipping database migrations");
            }
            Some(pool)
        }
        None => {
            tracing::warn!("No [database] section; accounts live in memory only");
            None
        }
    };

    // ── Step 2: Initialize cache ─────────────────────────────────
    tracing::info!(
        "Initializing cache (provider: {})...",
        config.cache.provider
    );
    let cache = Arc::new(CacheManager::new(&config.cache).await?);

    // ── Step 3: Wire auth components and state ───────────────────
    // Identity provider adapters are registered here by deployments that
    // ship them.
    let sweep_interval = Duration::from_secs(config.revocation.sweep_interval_seconds);
    let state = build_state(config, cache, database, IdentityProviders::new())?;

    // ── Step 4: Shutdown channel + revocation sweeper ────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper_handle =
        RevocationSweeper::new(Arc::clone(&state.revocations), sweep_interval).spawn(shutdown_rx);

    // ── Step 5: Build and start HTTP server ──────────────────────
    let addr = state.config.server.bind_address();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Bazaar server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 6: Wait for background tasks ────────────────────────
    let _ = tokio::time::timeout(Duration::from_secs(10), sweeper_handle).await;

    tracing::info!("Bazaar server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
