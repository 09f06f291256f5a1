//! # keyshop-core: Pure Domain Logic for Keyshop
//!
//! This crate is the **heart** of the Keyshop storefront. It holds the cart
//! math, the displayed-catalog bookkeeping and the wire types shared by the
//! product source server and the storefront client, all as pure code.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Keyshop Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront UI surfaces                          │   │
//! │  │   Badge ──► Cart page ──► Product grid ──► Search box           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ events                                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        keyshop-client (CartStore, CatalogSyncEngine, Search)    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ keyshop-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ catalog  │ │highlight│  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO TIMERS                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                ▲                                        │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │      keyshop-db + storefront-api (HTTP product source)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire types (ProductSummary, CatalogPage, CartLineItem, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - Cart line-item list and totals
//! - [`catalog`] - Displayed product set, duplicate tracking, sorting
//! - [`highlight`] - Search match highlighting
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use keyshop_core::cart::Cart;
//! use keyshop_core::money::Money;
//!
//! let mut cart = Cart::new();
//! cart.add_item("7", "Keycap Set", Money::from_cents(2499)).unwrap();
//!
//! let totals = cart.totals();
//! assert_eq!(totals.subtotal.cents(), 2499);
//! assert_eq!(totals.shipping.cents(), 999); // under the free-shipping bar
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod highlight;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Subtotal above which shipping is free (strictly greater than 100.00).
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_cents(100_00);

/// Flat shipping fee charged when the subtotal does not clear the threshold.
pub const FLAT_SHIPPING_FEE: Money = Money::from_cents(9_99);

/// Number of products requested per catalog page.
pub const CATALOG_PAGE_SIZE: u32 = 12;

/// Search queries shorter than this are never sent to the product source.
pub const MIN_SEARCH_QUERY_LEN: usize = 2;

/// Storage key holding the serialized cart line-item list.
pub const CART_STORAGE_KEY: &str = "cart";

/// Storage key holding the last chosen catalog view mode.
pub const VIEW_MODE_STORAGE_KEY: &str = "productViewMode";
