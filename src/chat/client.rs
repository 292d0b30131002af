//! HTTP client for the backend's completion endpoints.

use super::error::ChatError;
use super::event::StreamEvent;
use super::sse::SseDecoder;
use crate::config::ApiConfig;
use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Decoded events of one completion stream.
pub type EventStream = BoxStream<'static, Result<StreamEvent, ChatError>>;

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub prompt: &'a str,
    pub max_tokens: u32,
}

/// Response of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub generated_text: String,
    pub prompt: String,
    /// Seconds
    pub generation_time: f64,
    pub total_tokens: u32,
}

/// Something that can produce completions for a prompt.
#[async_trait]
pub trait CompletionSource: Send + Sync {
    /// Open a token stream. Dropping the returned stream closes the connection.
    async fn open_stream(&self, prompt: &str, max_tokens: u32) -> Result<EventStream, ChatError>;

    /// Generate the whole reply in one request.
    async fn generate(&self, prompt: &str, max_tokens: u32)
        -> Result<GenerateResponse, ChatError>;
}

/// [`CompletionSource`] backed by the inference gateway's HTTP API.
pub struct HttpCompletionClient {
    base_url: String,
    client: reqwest::Client,
    timeout_seconds: u64,
}

impl HttpCompletionClient {
    /// Create a client for the configured backend.
    ///
    /// Only connection setup is bounded by the timeout; streams may run for as
    /// long as generation takes.
    pub fn new(config: &ApiConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ChatError::Network(e.to_string()))?;

        Self::with_client(&config.base_url, client, config.timeout_seconds)
    }

    /// Create a client with a custom HTTP client (for testing).
    pub fn with_client(
        base_url: &str,
        client: reqwest::Client,
        timeout_seconds: u64,
    ) -> Result<Self, ChatError> {
        reqwest::Url::parse(base_url).map_err(|e| ChatError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_seconds,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn upstream_error(response: reqwest::Response) -> ChatError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        ChatError::Upstream { status, message }
    }
}

#[async_trait]
impl CompletionSource for HttpCompletionClient {
    async fn open_stream(&self, prompt: &str, max_tokens: u32) -> Result<EventStream, ChatError> {
        let url = self.endpoint("/api/stream");
        let max_tokens = max_tokens.to_string();

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "text/event-stream")
            .query(&[("prompt", prompt), ("max_tokens", max_tokens.as_str())])
            .send()
            .await
            .map_err(|e| ChatError::from_reqwest(e, self.timeout_seconds))?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        tracing::debug!(url = %url, "completion stream opened");

        let mut bytes = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut decoder = SseDecoder::new();

            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        for data in decoder.push(&chunk) {
                            yield Ok(StreamEvent::parse(&data));
                        }
                    }
                    Err(e) => {
                        yield Err(ChatError::Network(e.to_string()));
                        return;
                    }
                }
            }

            for data in decoder.finish() {
                yield Ok(StreamEvent::parse(&data));
            }
        };

        Ok(Box::pin(stream))
    }

    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<GenerateResponse, ChatError> {
        let url = self.endpoint("/api/generate");

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest { prompt, max_tokens })
            .timeout(Duration::from_secs(self.timeout_seconds))
            .send()
            .await
            .map_err(|e| ChatError::from_reqwest(e, self.timeout_seconds))?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))
    }
}
