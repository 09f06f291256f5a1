//! # Keyshop Storefront API
//!
//! HTTP JSON product source for the storefront client.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront API Server                               │
//! │                                                                         │
//! │  Client ───► axum Router ───► routes::* ───► keyshop-db ───► SQLite     │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                     keyshop-core wire types (JSON)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use keyshop_db::Database;

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    pub db: Database,

    /// Prepended to stored media paths (always ends with `/`).
    pub uploads_prefix: String,
}

impl AppState {
    pub fn new(db: Database, uploads_prefix: impl Into<String>) -> Self {
        let mut uploads_prefix = uploads_prefix.into();
        if !uploads_prefix.ends_with('/') {
            uploads_prefix.push('/');
        }
        AppState { db, uploads_prefix }
    }

    /// Public URL for a stored media path.
    pub fn media_url(&self, path: &str) -> String {
        format!("{}{}", self.uploads_prefix, path.trim_start_matches('/'))
    }
}

pub type SharedState = Arc<AppState>;

/// Builds the application router with every route.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/products", get(routes::products::list))
        .route("/api/products/filter", get(routes::products::filter))
        .route("/api/products/search", get(routes::products::search))
        .route("/api/products/{id}", get(routes::products::show))
        .route("/api/categories", get(routes::categories::list))
        .route("/health", get(routes::health::check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyshop_db::DbConfig;

    #[tokio::test]
    async fn test_media_url() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = AppState::new(db, "/uploads");
        assert_eq!(state.media_url("products/1-0.jpg"), "/uploads/products/1-0.jpg");
        assert_eq!(state.media_url("/a.jpg"), "/uploads/a.jpg");
    }
}
