//! Configuration types for tinystore
//!
//! Every field has a default so a partial (or missing) config file still
//! yields a runnable gateway.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration for tinystore
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Shared-secret gate configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse a TOML config file body
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Configuration(e.to_string()))
    }
}

/// HTTP server configuration
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Listen address for the HTTP API
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Database configuration
#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    /// Path of the redb database file
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Shared-secret gate configuration
#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    /// Reject requests that do not present one of `secrets`
    #[serde(default = "default_auth_enabled")]
    pub enabled: bool,
    /// Accepted shared secrets
    #[serde(default)]
    pub secrets: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: default_auth_enabled(),
            secrets: Vec::new(),
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8123".to_string()
}

const fn default_max_body_bytes() -> usize {
    100 * 1024 * 1024 // 100 MB
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tiny.db")
}

const fn default_auth_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.listen, "0.0.0.0:8123");
        assert_eq!(config.server.max_body_bytes, 100 * 1024 * 1024);
        assert_eq!(config.storage.path, PathBuf::from("tiny.db"));
        assert!(config.auth.enabled);
        assert!(config.auth.secrets.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [auth]
            secrets = ["open_sesame", "french^bread"]

            [storage]
            path = "/var/lib/tinystore/tiny.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.secrets, vec!["open_sesame", "french^bread"]);
        assert!(config.auth.enabled);
        assert_eq!(
            config.storage.path,
            PathBuf::from("/var/lib/tinystore/tiny.db")
        );
        assert_eq!(config.server.listen, "0.0.0.0:8123");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_file() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:8123");
    }

    #[test]
    fn test_malformed_file() {
        let err = Config::from_toml("[server]\nmax_body_bytes = \"lots\"").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(err.http_status_code(), 500);
    }
}
