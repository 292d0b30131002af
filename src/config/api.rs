//! Backend API configuration

use serde::{Deserialize, Serialize};

/// Where the inference backend's `/api` surface lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; `/api/...` paths are appended to it
    pub base_url: String,
    /// Timeout for non-streaming requests
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_seconds: 60,
        }
    }
}
