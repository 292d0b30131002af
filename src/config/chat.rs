//! Chat configuration

use serde::{Deserialize, Serialize};

/// Smallest accepted `max_tokens`.
pub const MIN_MAX_TOKENS: u32 = 1;
/// Largest accepted `max_tokens`.
pub const MAX_MAX_TOKENS: u32 = 1024;

/// Chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Upper bound on generated tokens per reply
    pub max_tokens: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { max_tokens: 256 }
    }
}
