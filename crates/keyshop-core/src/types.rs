//! # Domain Types
//!
//! Wire and state types shared by the product source server and the
//! storefront client.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │ ProductSummary  │   │  CatalogPage    │   │  CartLineItem   │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id             │   │  products[]     │   │  id             │        │
//! │  │  name, price    │   │  total          │   │  name (frozen)  │        │
//! │  │  stock          │   │  page, pages    │   │  price (frozen) │        │
//! │  │  category       │   └─────────────────┘   │  quantity ≥ 1   │        │
//! │  │  images[]       │   ┌─────────────────┐   └─────────────────┘        │
//! │  └─────────────────┘   │FilteredProducts │                              │
//! │                        │  products[]     │   ┌─────────────────┐        │
//! │  ┌─────────────────┐   │  total          │   │ ViewMode        │        │
//! │  │ SearchHit       │   └─────────────────┘   │  grid | full    │        │
//! │  │ Category        │                         │ SortOrder       │        │
//! │  │ FilterCriteria  │                         │  price-asc ...  │        │
//! │  └─────────────────┘                         └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lenient Decoding
//! The product source is a separate process and has historically sent
//! numeric ids, string prices and float page counts. Decoding accepts all
//! of these and normalizes them once, here. Missing list fields decode as
//! empty lists so partial responses never take the page down.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Product Id
// =============================================================================

/// Opaque product identifier.
///
/// JSON strings and numbers both normalize to the same string, so `7` and
/// `"7"` compare equal for duplicate tracking and cart identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
#[ts(export)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.len() == id.len() {
            ProductId(id)
        } else {
            ProductId(trimmed.to_string())
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Numeric value of the id, when it has one. Used by the "newest" sort.
    pub fn numeric(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ProductId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        ProductId::new(id)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        ProductId(id.to_string())
    }
}

impl Serialize for ProductId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => ProductId::from(n),
            RawId::Text(s) => ProductId::new(s),
        })
    }
}

// =============================================================================
// Lenient Counts
// =============================================================================

/// Decodes a count that may arrive as an integer, a float (`3.0`) or a
/// numeric string (`"12"`). Anything unreadable decodes as zero.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Integer(u64),
        Float(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match RawCount::deserialize(deserializer)? {
        RawCount::Integer(n) => n,
        RawCount::Float(f) if f.is_finite() && f > 0.0 => f.ceil() as u64,
        RawCount::Float(_) => 0,
        RawCount::Text(s) => s.trim().parse::<f64>().map(|f| f.max(0.0).ceil() as u64).unwrap_or(0),
        RawCount::Other(_) => 0,
    })
}

fn lenient_page<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    lenient_count(deserializer).map(|n| u32::try_from(n).unwrap_or(u32::MAX))
}

fn default_page() -> u32 {
    1
}

// =============================================================================
// Product Summary
// =============================================================================

/// Lightweight product record returned by the product source.
///
/// `images` holds every image path; the product source may send a single
/// `image` string instead. An empty list means the card shows a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProductSummaryWire", into = "ProductSummaryWire")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub category: Option<String>,
    pub images: Vec<String>,
}

impl ProductSummary {
    /// First image, if any.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// JSON shape of [`ProductSummary`]: carries both `image` and `images`.
#[doc(hidden)]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, rename = "ProductSummary")]
pub struct ProductSummaryWire {
    id: ProductId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Money,
    #[serde(default, deserialize_with = "lenient_stock")]
    #[ts(type = "number")]
    stock: i64,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, deserialize_with = "lenient_images")]
    images: Vec<String>,
}

fn lenient_stock<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// `images` may be an array, a single string or null.
fn lenient_images<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        Some(serde_json::Value::String(s)) if !s.is_empty() => vec![s],
        _ => Vec::new(),
    })
}

impl From<ProductSummaryWire> for ProductSummary {
    fn from(wire: ProductSummaryWire) -> Self {
        let images = if wire.images.is_empty() {
            wire.image.into_iter().filter(|s| !s.is_empty()).collect()
        } else {
            wire.images
        };
        ProductSummary {
            id: wire.id,
            name: wire.name,
            description: wire.description,
            price: wire.price,
            stock: wire.stock,
            category: wire.category,
            images,
        }
    }
}

impl From<ProductSummary> for ProductSummaryWire {
    fn from(product: ProductSummary) -> Self {
        ProductSummaryWire {
            image: product.images.first().cloned(),
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            category: product.category,
            images: product.images,
        }
    }
}

// =============================================================================
// Catalog Responses
// =============================================================================

/// One page of `GET /api/products`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogPage {
    #[serde(default)]
    #[ts(type = "Array<ProductSummary>")]
    pub products: Vec<ProductSummary>,

    #[serde(default, deserialize_with = "lenient_count")]
    #[ts(type = "number")]
    pub total: u64,

    /// 1-based page index that was served.
    #[serde(default = "default_page", deserialize_with = "lenient_page")]
    pub page: u32,

    /// Total page count at fetch time.
    #[serde(default, deserialize_with = "lenient_page")]
    pub pages: u32,
}

/// Response of `GET /api/products/filter`: the complete matching set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FilteredProducts {
    #[serde(default)]
    #[ts(type = "Array<ProductSummary>")]
    pub products: Vec<ProductSummary>,

    #[serde(default, deserialize_with = "lenient_count")]
    #[ts(type = "number")]
    pub total: u64,
}

/// One row of `GET /api/products/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchHit {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Money,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A product category, as listed by `GET /api/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    #[ts(type = "number")]
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Cart Line Item
// =============================================================================

/// One product entry in the cart.
///
/// `name` and `price` are captured when the product is first added and are
/// never re-synced with the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

impl CartLineItem {
    /// price × quantity
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

// =============================================================================
// View Mode
// =============================================================================

/// Display density of the product listing. Affects rendering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ViewMode {
    #[default]
    Grid,
    Full,
}

impl ViewMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::Full => "full",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "grid" => Ok(ViewMode::Grid),
            "full" => Ok(ViewMode::Full),
            other => Err(CoreError::UnknownViewMode(other.to_string())),
        }
    }
}

// =============================================================================
// Sort Order
// =============================================================================

/// Client-side ordering of the displayed product set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum SortOrder {
    PriceAsc,
    PriceDesc,
    Name,
    /// Descending numeric id.
    #[default]
    Newest,
}

impl SortOrder {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price-asc",
            SortOrder::PriceDesc => "price-desc",
            SortOrder::Name => "name",
            SortOrder::Newest => "newest",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "price-asc" => Ok(SortOrder::PriceAsc),
            "price-desc" => Ok(SortOrder::PriceDesc),
            "name" => Ok(SortOrder::Name),
            "newest" | "" => Ok(SortOrder::Newest),
            other => Err(CoreError::UnknownSortOrder(other.to_string())),
        }
    }
}

// =============================================================================
// Filter Criteria
// =============================================================================

/// Options recognized by `GET /api/products/filter`. Unset options are
/// not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FilterCriteria {
    /// Restrict to one category id.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub category: Option<i64>,

    /// Inclusive lower price bound.
    #[serde(default)]
    pub min_price: Option<Money>,

    /// Inclusive upper price bound.
    #[serde(default)]
    pub max_price: Option<Money>,

    /// Restrict to stock > 0.
    #[serde(default)]
    pub in_stock: bool,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && !self.in_stock
    }

    /// Query-string pairs for every option that is set.
    ///
    /// ```rust
    /// use keyshop_core::{FilterCriteria, Money};
    ///
    /// let criteria = FilterCriteria {
    ///     min_price: Some(Money::from_cents(1000)),
    ///     in_stock: true,
    ///     ..Default::default()
    /// };
    /// assert_eq!(
    ///     criteria.to_query_pairs(),
    ///     vec![("min_price", "10.00".to_string()), ("in_stock", "true".to_string())]
    /// );
    /// ```
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("min_price", min.to_decimal_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("max_price", max.to_decimal_string()));
        }
        if self.in_stock {
            pairs.push(("in_stock", "true".to_string()));
        }
        pairs
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
