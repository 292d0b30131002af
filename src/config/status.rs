//! Worker status polling configuration

use serde::{Deserialize, Serialize};

/// Worker status polling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Seconds between poll cycles
    pub interval_seconds: u64,
    /// Timeout for each worker request
    pub timeout_seconds: u64,
    /// Worker indexes to poll, in display order
    pub workers: Vec<u32>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 5,
            timeout_seconds: 5,
            workers: vec![1, 2, 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_config_defaults() {
        let config = StatusConfig::default();
        assert_eq!(config.interval_seconds, 5);
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.workers, vec![1, 2, 3]);
    }

    #[test]
    fn test_status_config_partial_toml() {
        let config: StatusConfig = toml::from_str("workers = [1, 2, 3, 4]").unwrap();
        assert_eq!(config.workers.len(), 4);
        assert_eq!(config.interval_seconds, 5);
    }
}
