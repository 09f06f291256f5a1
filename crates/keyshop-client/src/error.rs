//! # Client Error Types
//!
//! Error types for the storefront client.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐  │
//! │  │  Configuration  │  │   Transport     │  │     Response            │  │
//! │  │                 │  │                 │  │                         │  │
//! │  │  InvalidConfig  │  │  Connection     │  │  HttpStatus             │  │
//! │  │  InvalidUrl     │  │  Timeout        │  │  MalformedResponse      │  │
//! │  │  ConfigLoad/Save│  │                 │  │                         │  │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘  │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐  │
//! │  │    Storage      │  │     State       │  │      Domain             │  │
//! │  │                 │  │                 │  │                         │  │
//! │  │  StorageFailed  │  │  Busy           │  │  Validation             │  │
//! │  │                 │  │  Exhausted      │  │                         │  │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use keyshop_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering every failure the storefront client can see.
///
/// ## Design Principles
/// - Each variant includes enough context for debugging
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Product source URL cannot be parsed or has the wrong scheme.
    #[error("Invalid product source URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not reach the product source.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    // =========================================================================
    // Response Errors
    // =========================================================================
    /// The product source answered with a non-success status.
    #[error("Product source returned HTTP {status} for {path}")]
    HttpStatus { status: u16, path: String },

    /// The body could not be decoded at all.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Reading or writing persisted client state failed.
    #[error("Storage error: {0}")]
    StorageFailed(String),

    // =========================================================================
    // State Errors
    // =========================================================================
    /// A catalog fetch is already in flight.
    #[error("Catalog engine is busy")]
    Busy,

    /// Every page has already been loaded.
    #[error("No more pages to load")]
    Exhausted,

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Input rejected before any state was touched.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Domain value could not be interpreted.
    #[error("Domain error: {0}")]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::HttpStatus {
                status: status.as_u16(),
                path: err
                    .url()
                    .map(|u| u.path().to_string())
                    .unwrap_or_default(),
            }
        } else if err.is_decode() {
            ClientError::MalformedResponse(err.to_string())
        } else {
            ClientError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::MalformedResponse(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::StorageFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl ClientError {
    /// Returns true if the request may succeed when sent again.
    ///
    /// 5xx statuses and transport failures are retryable. 4xx statuses,
    /// malformed bodies and local state errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::ConnectionFailed(_) | ClientError::Timeout(_) => true,
            ClientError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if this is a configuration error.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::HttpStatus {
            status: 503,
            path: "/api/products".into(),
        };
        assert_eq!(
            err.to_string(),
            "Product source returned HTTP 503 for /api/products"
        );
        assert_eq!(ClientError::Busy.to_string(), "Catalog engine is busy");
    }

    #[test]
    fn test_is_retryable() {
        assert!(ClientError::ConnectionFailed("refused".into()).is_retryable());
        assert!(ClientError::Timeout("10s".into()).is_retryable());
        assert!(ClientError::HttpStatus { status: 502, path: "/".into() }.is_retryable());
        assert!(!ClientError::HttpStatus { status: 404, path: "/".into() }.is_retryable());
        assert!(!ClientError::MalformedResponse("eof".into()).is_retryable());
        assert!(!ClientError::Busy.is_retryable());
    }

    #[test]
    fn test_is_config_error() {
        assert!(ClientError::InvalidUrl("ftp://x".into()).is_config_error());
        assert!(!ClientError::Exhausted.is_config_error());
    }

    #[test]
    fn test_validation_converts() {
        let err: ClientError = ValidationError::Required {
            field: "id".into(),
        }
        .into();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
