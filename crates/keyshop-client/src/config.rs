//! # Client Configuration
//!
//! Configuration for the storefront client.
//!
//! ## Configuration Sources (Priority Order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Loading                                │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     KEYSHOP_BASE_URL=http://shop.local:3000                             │
//! │     KEYSHOP_PAGE_SIZE=24                                                │
//! │     KEYSHOP_DEBOUNCE_MS=250                                             │
//! │                                                                         │
//! │  2. Config File (client.toml in the platform config dir)                │
//! │     [source]                                                            │
//! │     base_url = "http://localhost:3000"                                  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     page_size = 12, debounce_ms = 300, max_retries = 0                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use keyshop_core::CATALOG_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Product Source Settings
// =============================================================================

/// Where the product source lives and how hard to try reaching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Base URL that `/api/...` paths are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Extra attempts after a retryable failure (0 = no retry).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay in milliseconds.
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling in seconds.
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_request_timeout() -> u64 {
    10
}
fn default_max_retries() -> u32 {
    0
}
fn default_initial_backoff() -> u64 {
    250
}
fn default_max_backoff() -> u64 {
    5
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

// =============================================================================
// Catalog Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Products requested per `load_more` call.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    CATALOG_PAGE_SIZE
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            page_size: default_page_size(),
        }
    }
}

// =============================================================================
// Search Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Quiet period after the last keystroke before a search is sent.
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

fn default_debounce() -> u64 {
    300
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            debounce_ms: default_debounce(),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory for persisted cart and view mode. `None` uses the
    /// platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
///
/// ## Example Config File
/// ```toml
/// [source]
/// base_url = "https://shop.example.com"
/// request_timeout_secs = 10
/// max_retries = 2
///
/// [catalog]
/// page_size = 12
///
/// [search]
/// debounce_ms = 300
///
/// [storage]
/// data_dir = "/var/lib/keyshop"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (client.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| ClientError::ConfigLoadFailed(e.to_string()))?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = url::Url::parse(&self.source.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "Product source URL must start with http:// or https://, got: {}",
                self.source.base_url
            )));
        }

        if self.catalog.page_size == 0 {
            return Err(ClientError::InvalidConfig(
                "page_size must be greater than 0".into(),
            ));
        }

        if self.search.debounce_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "debounce_ms must be greater than 0".into(),
            ));
        }

        if self.source.request_timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("KEYSHOP_BASE_URL") {
            debug!(url = %url, "Overriding product source URL from environment");
            self.source.base_url = url;
        }

        if let Ok(size) = std::env::var("KEYSHOP_PAGE_SIZE") {
            match size.parse::<u32>() {
                Ok(n) => self.catalog.page_size = n,
                Err(_) => warn!(value = %size, "Ignoring invalid KEYSHOP_PAGE_SIZE"),
            }
        }

        if let Ok(ms) = std::env::var("KEYSHOP_DEBOUNCE_MS") {
            match ms.parse::<u64>() {
                Ok(n) => self.search.debounce_ms = n,
                Err(_) => warn!(value = %ms, "Ignoring invalid KEYSHOP_DEBOUNCE_MS"),
            }
        }

        if let Ok(secs) = std::env::var("KEYSHOP_REQUEST_TIMEOUT_SECS") {
            if let Ok(n) = secs.parse::<u64>() {
                self.source.request_timeout_secs = n;
            }
        }

        if let Ok(retries) = std::env::var("KEYSHOP_MAX_RETRIES") {
            if let Ok(n) = retries.parse::<u32>() {
                debug!(max_retries = n, "Overriding max retries from environment");
                self.source.max_retries = n;
            }
        }

        if let Ok(dir) = std::env::var("KEYSHOP_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "keyshop", "storefront")
            .map(|dirs| dirs.config_dir().join("client.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.request_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    pub fn page_size(&self) -> u32 {
        self.catalog.page_size
    }
}
