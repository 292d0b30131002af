//! Configuration module for the dllama console
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`DLLAMA_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use dllama::config::DllamaConfig;
//!
//! let config = DllamaConfig::default();
//! assert_eq!(config.chat.max_tokens, 256);
//!
//! let toml = r#"
//! [api]
//! base_url = "http://backend:8000"
//! "#;
//! let config: DllamaConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.api.base_url, "http://backend:8000");
//! assert_eq!(config.status.workers, vec![1, 2, 3]);
//! ```

pub mod api;
pub mod chat;
pub mod error;
pub mod logging;
pub mod status;

pub use api::ApiConfig;
pub use chat::{ChatConfig, MAX_MAX_TOKENS, MIN_MAX_TOKENS};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use status::StatusConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the console.
///
/// # Example
///
/// ```rust
/// use dllama::config::DllamaConfig;
///
/// let config = DllamaConfig::default();
/// assert_eq!(config.status.interval_seconds, 5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DllamaConfig {
    /// Backend API location
    pub api: ApiConfig,
    /// Chat defaults
    pub chat: ChatConfig,
    /// Worker status polling
    pub status: StatusConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl DllamaConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Load from `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(Some(path))
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports DLLAMA_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("DLLAMA_API_URL") {
            if !url.is_empty() {
                self.api.base_url = url;
            }
        }
        if let Ok(max_tokens) = std::env::var("DLLAMA_MAX_TOKENS") {
            if let Ok(n) = max_tokens.parse() {
                self.chat.max_tokens = n;
            }
        }
        if let Ok(interval) = std::env::var("DLLAMA_POLL_INTERVAL") {
            if let Ok(secs) = interval.parse() {
                self.status.interval_seconds = secs;
            }
        }

        if let Ok(level) = std::env::var("DLLAMA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("DLLAMA_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "api.base_url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        }
        match reqwest::Url::parse(&self.api.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => {
                return Err(ConfigError::Validation {
                    field: "api.base_url".to_string(),
                    message: format!("unsupported scheme '{}'", url.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::Validation {
                    field: "api.base_url".to_string(),
                    message: e.to_string(),
                });
            }
        }

        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&self.chat.max_tokens) {
            return Err(ConfigError::Validation {
                field: "chat.max_tokens".to_string(),
                message: format!(
                    "must be between {} and {}",
                    MIN_MAX_TOKENS, MAX_MAX_TOKENS
                ),
            });
        }

        if self.status.interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "status.interval_seconds".to_string(),
                message: "interval must be non-zero".to_string(),
            });
        }
        if self.status.workers.is_empty() {
            return Err(ConfigError::Validation {
                field: "status.workers".to_string(),
                message: "at least one worker is required".to_string(),
            });
        }

        self.logging.validate()
    }
}
