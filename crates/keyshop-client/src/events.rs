//! # Change Notifications
//!
//! Each stateful component owns a `tokio::sync::broadcast` channel. Display
//! surfaces (badge, cart page, product grid, search dropdown) subscribe and
//! re-render from the event instead of reading shared storage themselves.
//!
//! ```text
//! ┌────────────┐  CartEvent     ┌──────────────────────────────┐
//! │ CartStore  │ ─────────────► │ badge, cart page, toast      │
//! └────────────┘                └──────────────────────────────┘
//! ┌────────────┐  CatalogEvent  ┌──────────────────────────────┐
//! │ Catalog    │ ─────────────► │ product grid, load-more btn  │
//! │ SyncEngine │                └──────────────────────────────┘
//! └────────────┘
//! ┌────────────┐  SearchEvent   ┌──────────────────────────────┐
//! │ Search     │ ─────────────► │ search dropdown / modal      │
//! │ Controller │                └──────────────────────────────┘
//! └────────────┘
//! ```
//!
//! Events are tagged JSON when serialized (`{"type":"changed",...}`), so a
//! webview bridge can forward them unchanged.

use keyshop_core::cart::CartTotals;
use keyshop_core::{ProductId, SearchHit, SortOrder, ViewMode};
use serde::Serialize;

/// Capacity of every component channel. A subscriber that falls this far
/// behind sees `RecvError::Lagged` and should re-read the component state.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    /// The line-item list changed. Carries what the badge and summary need.
    Changed { badge_count: u64, totals: CartTotals },

    /// User-visible confirmation after `add_item`.
    ItemAdded {
        id: ProductId,
        name: String,
        quantity: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogEvent {
    /// A page was appended. `added` excludes products already displayed.
    Appended { page: u32, added: usize },

    /// A filter replaced the whole displayed set.
    Replaced { count: usize },

    /// A filter matched nothing; show the placeholder.
    NoResults,

    /// No further pages will be requested this session.
    Exhausted,

    Sorted { order: SortOrder },

    ViewModeChanged { mode: ViewMode },

    /// A fetch failed. The displayed set is unchanged.
    Error { message: String, retryable: bool },
}

/// A search hit with its name ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightedHit {
    #[serde(flatten)]
    pub hit: SearchHit,

    /// HTML-escaped name with the query match wrapped in `<strong>`.
    pub name_html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchEvent {
    /// The input was emptied; hide the dropdown.
    Cleared,

    Results {
        query: String,
        hits: Vec<HighlightedHit>,
    },

    NoResults { query: String },

    Failed { query: String, message: String },
}
