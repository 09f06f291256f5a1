//! # Catalog Sync Engine
//!
//! Paginated loading, filtering, sorting and view mode for the product grid.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │        load_more()                         filter_products(criteria)    │
//! │   ┌──────────────────┐                  ┌──────────────────────┐        │
//! │   │                  ▼                  │                      ▼        │
//! │ ┌─┴────┐       ┌─────────────┐        ┌─┴────┐          ┌───────────┐   │
//! │ │ Idle │◄──────│ LoadingMore │        │ Idle │◄─────────│ Filtering │   │
//! │ └──────┘  ok / └─────────────┘        └──────┘  ok /    └───────────┘   │
//! │           error                                 error                   │
//! │                                                                         │
//! │  Any call while not Idle returns ClientError::Busy without fetching.    │
//! │  has_more goes false on an empty page, the last page, or any filter,    │
//! │  and stays false for the life of the engine.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policy
//! A failed fetch leaves the displayed set and page counter untouched,
//! logs the error, emits [`CatalogEvent::Error`] and returns the engine to
//! `Idle`. The error is also returned so callers that care can inspect it.

use std::sync::{Arc, Mutex, MutexGuard};

use keyshop_core::catalog::{DisplayedProductSet, ProductCard};
use keyshop_core::validation::validate_filter_range;
use keyshop_core::{
    CatalogPage, Category, FilterCriteria, ProductSummary, SortOrder, ViewMode,
    VIEW_MODE_STORAGE_KEY,
};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::events::{CatalogEvent, EVENT_CHANNEL_CAPACITY};
use crate::source::ProductSource;
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Idle,
    LoadingMore,
    Filtering,
}

#[derive(Debug)]
struct Inner {
    state: EngineState,
    displayed: DisplayedProductSet,
    current_page: u32,
    has_more: bool,
    no_results: bool,
}

pub struct CatalogSyncEngine {
    source: Arc<dyn ProductSource>,
    storage: Arc<dyn KeyValueStore>,
    page_size: u32,
    inner: Mutex<Inner>,
    events: broadcast::Sender<CatalogEvent>,
}

/// Returns the engine to `Idle` when a fetch finishes, fails or is dropped.
struct IdleOnDrop<'a> {
    engine: &'a CatalogSyncEngine,
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.engine.lock().state = EngineState::Idle;
    }
}

impl CatalogSyncEngine {
    /// Creates an engine with nothing displayed and the persisted view mode.
    pub fn new(
        source: Arc<dyn ProductSource>,
        storage: Arc<dyn KeyValueStore>,
        page_size: u32,
    ) -> Self {
        let view_mode = load_view_mode(storage.as_ref());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        CatalogSyncEngine {
            source,
            storage,
            page_size: page_size.max(1),
            inner: Mutex::new(Inner {
                state: EngineState::Idle,
                displayed: DisplayedProductSet::new(view_mode),
                current_page: 0,
                has_more: true,
                no_results: false,
            }),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    /// Registers a page that was already rendered before the engine started
    /// (the server-rendered first page), so `load_more` continues after it
    /// and never appends those products again.
    pub fn seed_initial(&self, page: CatalogPage) -> usize {
        let mut inner = self.lock();
        let added = inner.displayed.append_unique(page.products);
        inner.current_page = inner.current_page.max(page.page);
        if page.page >= page.pages {
            inner.has_more = false;
        }
        debug!(page = page.page, pages = page.pages, added, "Seeded catalog");
        added
    }

    // =========================================================================
    // Fetching Operations
    // =========================================================================

    /// Fetches the next page and appends the products not yet displayed.
    /// Returns how many were appended.
    ///
    /// ## Errors
    /// - `Busy` if another fetch is in flight
    /// - `Exhausted` once no more pages will be loaded
    /// - the transport error if the fetch failed
    pub async fn load_more(&self) -> ClientResult<usize> {
        let next_page = {
            let mut inner = self.lock();
            if inner.state != EngineState::Idle {
                debug!(state = ?inner.state, "load_more ignored, engine busy");
                return Err(ClientError::Busy);
            }
            if !inner.has_more {
                return Err(ClientError::Exhausted);
            }
            inner.state = EngineState::LoadingMore;
            inner.current_page + 1
        };
        let _idle = IdleOnDrop { engine: self };

        debug!(page = next_page, limit = self.page_size, "Loading catalog page");
        let page = match self.source.fetch_page(next_page, self.page_size).await {
            Ok(page) => page,
            Err(e) => return Err(self.report_failure(e, "load_more")),
        };

        let returned = page.products.len();
        let (added, exhausted) = {
            let mut inner = self.lock();
            let added = inner.displayed.append_unique(page.products);
            inner.current_page = next_page;
            let exhausted = returned == 0 || next_page >= page.pages;
            if exhausted {
                inner.has_more = false;
            }
            (added, exhausted)
        };

        debug!(page = next_page, returned, added, "Appended catalog page");
        self.emit(CatalogEvent::Appended {
            page: next_page,
            added,
        });
        if exhausted {
            info!(page = next_page, "Catalog fully loaded");
            self.emit(CatalogEvent::Exhausted);
        }
        Ok(added)
    }

    /// Replaces the displayed set with every product matching `criteria`
    /// and turns off incremental loading. Returns the new product count.
    ///
    /// ## Errors
    /// - `Validation` for a negative or inverted price range (nothing sent)
    /// - `Busy` if another fetch is in flight
    /// - the transport error if the fetch failed
    pub async fn filter_products(&self, criteria: FilterCriteria) -> ClientResult<usize> {
        validate_filter_range(&criteria)?;

        {
            let mut inner = self.lock();
            if inner.state != EngineState::Idle {
                debug!(state = ?inner.state, "filter ignored, engine busy");
                return Err(ClientError::Busy);
            }
            inner.state = EngineState::Filtering;
        }
        let _idle = IdleOnDrop { engine: self };

        debug!(?criteria, "Filtering catalog");
        let result = match self.source.filter(&criteria).await {
            Ok(result) => result,
            Err(e) => return Err(self.report_failure(e, "filter")),
        };

        let (count, was_loading) = {
            let mut inner = self.lock();
            let count = inner.displayed.replace_all(result.products);
            let was_loading = inner.has_more;
            inner.has_more = false;
            inner.no_results = count == 0;
            (count, was_loading)
        };

        info!(count, total = result.total, "Catalog filtered");
        if count == 0 {
            self.emit(CatalogEvent::NoResults);
        } else {
            self.emit(CatalogEvent::Replaced { count });
        }
        if was_loading {
            self.emit(CatalogEvent::Exhausted);
        }
        Ok(count)
    }

    /// Categories for the filter controls. Failures yield an empty list.
    pub async fn categories(&self) -> Vec<Category> {
        match self.source.categories().await {
            Ok(categories) => categories,
            Err(e) => {
                warn!(error = %e, "Failed to load categories");
                Vec::new()
            }
        }
    }

    // =========================================================================
    // Local Operations
    // =========================================================================

    /// Reorders the displayed products. No network call.
    pub fn sort_products(&self, order: SortOrder) {
        self.lock().displayed.sort(order);
        debug!(%order, "Sorted catalog");
        self.emit(CatalogEvent::Sorted { order });
    }

    /// Switches every card's layout and remembers the choice.
    pub fn set_view_mode(&self, mode: ViewMode) {
        {
            let mut inner = self.lock();
            if inner.displayed.view_mode() == mode {
                return;
            }
            inner.displayed.set_view_mode(mode);
        }
        if let Err(e) = self.storage.set(VIEW_MODE_STORAGE_KEY, mode.as_str()) {
            warn!(error = %e, "Failed to persist view mode");
        }
        debug!(%mode, "View mode changed");
        self.emit(CatalogEvent::ViewModeChanged { mode });
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn state(&self) -> EngineState {
        self.lock().state
    }

    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    /// True after a filter matched nothing; the grid shows a placeholder.
    pub fn no_results(&self) -> bool {
        self.lock().no_results
    }

    pub fn current_page(&self) -> u32 {
        self.lock().current_page
    }

    pub fn view_mode(&self) -> ViewMode {
        self.lock().displayed.view_mode()
    }

    pub fn products(&self) -> Vec<ProductSummary> {
        self.lock().displayed.items().to_vec()
    }

    pub fn cards(&self) -> Vec<ProductCard> {
        self.lock().displayed.cards()
    }

    pub fn len(&self) -> usize {
        self.lock().displayed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().displayed.is_empty()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn report_failure(&self, error: ClientError, operation: &str) -> ClientError {
        warn!(operation, error = %error, "Catalog fetch failed");
        self.emit(CatalogEvent::Error {
            message: error.to_string(),
            retryable: error.is_retryable(),
        });
        error
    }

    fn emit(&self, event: CatalogEvent) {
        let _ = self.events.send(event);
    }
}

fn load_view_mode(storage: &dyn KeyValueStore) -> ViewMode {
    match storage.get(VIEW_MODE_STORAGE_KEY) {
        Ok(Some(stored)) => stored.parse().unwrap_or_else(|_| {
            warn!(stored = %stored, "Unknown persisted view mode, using grid");
            ViewMode::default()
        }),
        Ok(None) => ViewMode::default(),
        Err(e) => {
            warn!(error = %e, "Failed to read view mode");
            ViewMode::default()
        }
    }
}
