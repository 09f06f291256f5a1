//! Storefront API configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Interface to bind
    pub bind_addr: String,

    /// SQLite catalog file
    pub db_path: String,

    /// Prefix turning stored media paths into public URLs
    pub uploads_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            http_port: 3000,
            bind_addr: "0.0.0.0".to_string(),
            db_path: "./keyshop.db".to_string(),
            uploads_prefix: "/uploads/".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();

        let http_port = match lookup("KEYSHOP_HTTP_PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("KEYSHOP_HTTP_PORT".to_string()))?,
            None => defaults.http_port,
        };

        let mut uploads_prefix = lookup("KEYSHOP_UPLOADS_PREFIX").unwrap_or(defaults.uploads_prefix);
        if !uploads_prefix.ends_with('/') {
            uploads_prefix.push('/');
        }

        let config = ServerConfig {
            http_port,
            bind_addr: lookup("KEYSHOP_BIND_ADDR").unwrap_or(defaults.bind_addr),
            db_path: lookup("KEYSHOP_DB_PATH").unwrap_or(defaults.db_path),
            uploads_prefix,
        };

        if config.db_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("KEYSHOP_DB_PATH".to_string()));
        }
        config.socket_addr()?;

        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.http_port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("KEYSHOP_BIND_ADDR".to_string()))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
