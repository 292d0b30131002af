//! `[logging]` section: stderr log level, output format and per-module overrides.
//!
//! Overrides are keyed by the crate's top-level modules, so
//! `component_levels = { status = "debug" }` becomes the directive
//! `dllama::status=debug`. Unknown module names and unparseable levels are
//! rejected at load time instead of silently producing a filter that never
//! matches.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

/// Modules that accept a `component_levels` override.
pub const LOG_COMPONENTS: &[&str] = &["chat", "cli", "config", "logging", "status"];

/// How stderr log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Multi-line human output, the default for terminals
    #[default]
    Pretty,
    /// One JSON object per event, for piping `dllama status --watch` logs elsewhere
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level; `warn` keeps stderr quiet while tokens stream to stdout
    pub level: String,
    pub format: LogFormat,
    /// Per-module levels, e.g. `{ status = "debug" }` to trace poll cycles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_levels: Option<HashMap<String, String>>,
    /// Log a truncated prompt with each chat request
    #[serde(default)]
    pub enable_content_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
            component_levels: None,
            enable_content_logging: false,
        }
    }
}

impl LoggingConfig {
    /// Check the base level and every per-module override.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_level("logging.level", &self.level)?;

        let Some(levels) = &self.component_levels else {
            return Ok(());
        };
        for (component, level) in levels {
            let field = format!("logging.component_levels.{}", component);
            if !LOG_COMPONENTS.contains(&component.as_str()) {
                return Err(ConfigError::Validation {
                    field,
                    message: format!(
                        "unknown component (expected one of: {})",
                        LOG_COMPONENTS.join(", ")
                    ),
                });
            }
            parse_level(&field, level)?;
        }
        Ok(())
    }
}

fn parse_level(field: &str, level: &str) -> Result<LevelFilter, ConfigError> {
    LevelFilter::from_str(level.trim()).map_err(|_| ConfigError::Validation {
        field: field.to_string(),
        message: format!("'{}' is not a log level", level),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_components(pairs: &[(&str, &str)]) -> LoggingConfig {
        LoggingConfig {
            component_levels: Some(
                pairs
                    .iter()
                    .map(|(c, l)| (c.to_string(), l.to_string()))
                    .collect(),
            ),
            ..LoggingConfig::default()
        }
    }

    #[test]
    fn test_defaults_keep_stderr_quiet() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(!config.enable_content_logging);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_format_from_env_value() {
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert!(LogFormat::from_str("logfmt").is_err());
    }

    #[test]
    fn test_parse_logging_section() {
        let config: LoggingConfig = toml::from_str(
            r#"
            level = "info"
            format = "json"
            component_levels = { status = "debug", chat = "trace" }
            "#,
        )
        .unwrap();

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.component_levels.as_ref().unwrap()["status"], "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_base_level() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };
        match config.validate() {
            Err(ConfigError::Validation { field, .. }) => assert_eq!(field, "logging.level"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_unknown_component() {
        let config = with_components(&[("poller", "debug")]);
        match config.validate() {
            Err(ConfigError::Validation { field, message }) => {
                assert_eq!(field, "logging.component_levels.poller");
                assert!(message.contains("status"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_component_level() {
        let config = with_components(&[("chat", "chatty")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_off_and_mixed_case() {
        let config = LoggingConfig {
            level: "OFF".to_string(),
            ..with_components(&[("status", "Debug")])
        };
        assert!(config.validate().is_ok());
    }
}
