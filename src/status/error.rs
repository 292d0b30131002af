//! Error types for worker status polling.

use thiserror::Error;

/// Errors that can occur while fetching worker status.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatusError {
    /// Request timeout
    #[error("request timeout after {0}s")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Invalid response
    #[error("invalid response: {0}")]
    ParseError(String),

    /// Backend URL could not be used to build a request
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl StatusError {
    /// Classify reqwest error into StatusError.
    pub(crate) fn classify(e: reqwest::Error, timeout_seconds: u64) -> Self {
        if e.is_timeout() {
            StatusError::Timeout(timeout_seconds)
        } else {
            StatusError::ConnectionFailed(e.to_string())
        }
    }
}
