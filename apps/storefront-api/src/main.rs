//! # Keyshop Storefront API
//!
//! Serves the product catalog over HTTP JSON.
//!
//! ## Usage
//! ```bash
//! cargo run -p keyshop-db --bin seed -- --db ./keyshop.db
//! KEYSHOP_DB_PATH=./keyshop.db cargo run -p keyshop-storefront-api
//! ```

use std::sync::Arc;

use anyhow::Context;
use keyshop_db::{Database, DbConfig};
use keyshop_storefront_api::config::ServerConfig;
use keyshop_storefront_api::{router, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,keyshop=debug,sqlx=warn")),
        )
        .with_target(true)
        .init();

    info!("Starting Keyshop storefront API...");

    let config = ServerConfig::load()?;
    let addr = config.socket_addr()?;
    info!(%addr, db = %config.db_path, uploads = %config.uploads_prefix, "Configuration loaded");

    let db = Database::new(DbConfig::new(&config.db_path))
        .await
        .with_context(|| format!("opening catalog database {}", config.db_path))?;
    info!("Catalog database ready");

    let state = Arc::new(AppState::new(db.clone(), config.uploads_prefix.clone()));
    let app = router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
