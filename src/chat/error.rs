//! Error types for the chat client.

use thiserror::Error;

/// Errors that can end a chat request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChatError {
    /// Connection refused, DNS failure, or the body stream broke mid-read
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline
    #[error("Request timeout after {0}s")]
    Timeout(u64),

    /// Backend answered with a non-success status
    #[error("Backend error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Response body doesn't match the expected format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Event stream ended without the `[DONE]` sentinel
    #[error("stream closed before completion")]
    StreamClosed,

    /// Backend URL could not be used to build a request
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl ChatError {
    /// Classify a reqwest error the same way for every request kind.
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout_seconds: u64) -> Self {
        if e.is_timeout() {
            ChatError::Timeout(timeout_seconds)
        } else if e.is_decode() {
            ChatError::InvalidResponse(e.to_string())
        } else {
            ChatError::Network(e.to_string())
        }
    }
}
