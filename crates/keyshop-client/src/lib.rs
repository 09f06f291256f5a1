//! # keyshop-client: Storefront Client Core for Keyshop
//!
//! Browsing-session state for the storefront: the persisted cart, the
//! incrementally loaded product grid and the debounced search box.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        keyshop-client                                   │
//! │                                                                         │
//! │   ┌──────────────┐   ┌───────────────────┐   ┌──────────────────┐       │
//! │   │  CartStore   │   │ CatalogSyncEngine │   │ SearchController │       │
//! │   │ (cart_store) │   │    (catalog)      │   │    (search)      │       │
//! │   └──────┬───────┘   └────┬─────────┬────┘   └────────┬─────────┘       │
//! │          │                │         │                 │                 │
//! │          ▼                ▼         ▼                 ▼                 │
//! │   ┌──────────────────────────┐   ┌──────────────────────────────┐       │
//! │   │  KeyValueStore (storage) │   │  ProductSource (source)      │       │
//! │   │  "cart"                  │   │  HttpProductSource ──► HTTP  │       │
//! │   │  "productViewMode"       │   │                              │       │
//! │   └──────────────────────────┘   └──────────────────────────────┘       │
//! │                                                                         │
//! │   Change notifications: tokio broadcast channels (events)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keyshop_client::{ClientConfig, Storefront};
//!
//! let config = ClientConfig::load_or_default(None);
//! let shop = Storefront::from_config(&config)?;
//!
//! shop.catalog.load_more().await?;
//! shop.cart.add_item("7", "Keycap Set", Money::from_cents(2499))?;
//! shop.search.on_input("key");
//! ```

pub mod cart_store;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod search;
pub mod source;
pub mod storage;

use std::sync::Arc;

pub use cart_store::CartStore;
pub use catalog::{CatalogSyncEngine, EngineState};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use events::{CartEvent, CatalogEvent, HighlightedHit, SearchEvent};
pub use search::SearchController;
pub use source::{HttpProductSource, ProductSource};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

/// The three storefront components wired to one product source and one
/// storage backend.
pub struct Storefront {
    pub cart: Arc<CartStore>,
    pub catalog: Arc<CatalogSyncEngine>,
    pub search: Arc<SearchController>,
}

impl Storefront {
    /// Wires everything from configuration: HTTP product source and a
    /// file store in `storage.data_dir` (or the platform data directory).
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let source: Arc<dyn ProductSource> = Arc::new(HttpProductSource::new(config)?);
        let storage: Arc<dyn KeyValueStore> = match &config.storage.data_dir {
            Some(dir) => Arc::new(FileStore::new(dir)?),
            None => Arc::new(FileStore::in_default_location()?),
        };
        Ok(Self::with_parts(config, source, storage))
    }

    pub fn with_parts(
        config: &ClientConfig,
        source: Arc<dyn ProductSource>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        Storefront {
            cart: Arc::new(CartStore::new(Arc::clone(&storage))),
            catalog: Arc::new(CatalogSyncEngine::new(
                Arc::clone(&source),
                storage,
                config.page_size(),
            )),
            search: Arc::new(SearchController::new(source, config.debounce())),
        }
    }
}
