//! # Error Types
//!
//! Domain-specific error types for keyshop-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  keyshop-core errors (this file)                                        │
//! │  ├── CoreError        - Parse failures for domain values                │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  keyshop-db errors                                                      │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  keyshop-client errors                                                  │
//! │  └── ClientError      - Transport / storage / config failures           │
//! │                                                                         │
//! │  storefront-api errors                                                  │
//! │  └── ApiError         - What HTTP callers see (status + JSON body)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while interpreting domain values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A monetary amount could not be parsed.
    ///
    /// ## When This Occurs
    /// - Price string is not a decimal (`"abc"`, `"1.2.3"`)
    /// - More than two fractional digits (`"9.999"`)
    /// - Float price is NaN or infinite
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    /// Unknown sort order key.
    #[error("Unknown sort order '{0}'. Valid options: price-asc, price-desc, name, newest")]
    UnknownSortOrder(String),

    /// Unknown view mode key.
    #[error("Unknown view mode '{0}'. Valid options: grid, full")]
    UnknownViewMode(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub(crate) fn invalid_amount(input: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidAmount {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at the boundary of a mutation (cart add, filter request) before
/// any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Lower bound is greater than upper bound.
    #[error("{lower} must not exceed {upper}")]
    InvertedRange { lower: String, upper: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
