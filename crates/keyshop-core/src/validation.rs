//! # Validation Module
//!
//! Input validation for cart mutations, catalog queries and catalog writes.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Storefront client                                                      │
//! │  ├── Cart::add_item ──────► validate_product_id, validate_price         │
//! │  ├── Search controller ───► validate_search_query                       │
//! │  └── Catalog filter ──────► validate_filter_range                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Product source server                                                  │
//! │  └── Repository writes ───► validate_product_name, validate_stock, ...  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  SQLite                                                                 │
//! │  └── NOT NULL / CHECK / FOREIGN KEY constraints                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use keyshop_core::validation::{validate_search_query, validate_product_name};
//!
//! assert_eq!(validate_search_query("  key ").unwrap(), "key");
//! assert!(validate_search_query("k").is_err());
//! assert!(validate_product_name("GMK Olivia Keycaps").is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{FilterCriteria, ProductId};
use crate::MIN_SEARCH_QUERY_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest search query forwarded to the product source.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;

const MAX_PRODUCT_NAME_LEN: usize = 255;
const MAX_CATEGORY_NAME_LEN: usize = 100;

// =============================================================================
// Identity & Money
// =============================================================================

pub fn validate_product_id(id: &ProductId) -> ValidationResult<()> {
    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }
    Ok(())
}

/// Prices must be ≥ 0. Free items are allowed.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 255 characters (the column width)
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name, MAX_PRODUCT_NAME_LEN)
}

pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    validate_name("category", name, MAX_CATEGORY_NAME_LEN)
}

fn validate_name(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a search-as-you-type query and returns it trimmed.
///
/// Length is counted in characters, so `"é"` is one character.
///
/// ```rust
/// use keyshop_core::validation::validate_search_query;
///
/// assert!(validate_search_query("ab").is_ok());
/// assert!(validate_search_query(" a ").is_err());
/// ```
pub fn validate_search_query(query: &str) -> ValidationResult<&str> {
    let query = query.trim();
    let len = query.chars().count();

    if len == 0 {
        return Err(ValidationError::Required {
            field: "q".to_string(),
        });
    }
    if len < MIN_SEARCH_QUERY_LEN {
        return Err(ValidationError::TooShort {
            field: "q".to_string(),
            min: MIN_SEARCH_QUERY_LEN,
        });
    }
    if len > MAX_SEARCH_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "q".to_string(),
            max: MAX_SEARCH_QUERY_LEN,
        });
    }
    Ok(query)
}

// =============================================================================
// Filter Validators
// =============================================================================

/// Price bounds must be non-negative and ordered.
pub fn validate_filter_range(criteria: &FilterCriteria) -> ValidationResult<()> {
    if let Some(min) = criteria.min_price {
        if min.is_negative() {
            return Err(ValidationError::Negative {
                field: "min_price".to_string(),
            });
        }
    }
    if let Some(max) = criteria.max_price {
        if max.is_negative() {
            return Err(ValidationError::Negative {
                field: "max_price".to_string(),
            });
        }
    }
    if let (Some(min), Some(max)) = (criteria.min_price, criteria.max_price) {
        if min > max {
            return Err(ValidationError::InvertedRange {
                lower: "min_price".to_string(),
                upper: "max_price".to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
