//! Worker network-status polling.
//!
//! [`StatusPoller`] fetches every configured worker's network counters on a
//! fixed interval and publishes the result to a [`StatusBoard`]. A failed
//! cycle is logged and dropped; the previous snapshot stays on the board.

mod board;
mod error;
mod format;
mod types;

pub use board::{Snapshot, StatusBoard};
pub use error::StatusError;
pub use format::{
    format_bytes, is_latency_high, latency_label, network_io_label, packet_loss_label,
    HIGH_LATENCY_MS,
};
pub use types::{
    NetworkStats, NetworkStatus, PerformanceReport, PerformanceSummary, SystemStatus,
    WorkerAvailability, WorkerMetrics,
};

use crate::config::StatusConfig;
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Background service that periodically fetches worker network status.
pub struct StatusPoller {
    /// Backend base URL without trailing slash
    base_url: String,
    /// HTTP client with connection pooling
    client: reqwest::Client,
    /// Polling configuration
    config: StatusConfig,
    /// Where successful snapshots are published
    board: StatusBoard,
}

impl StatusPoller {
    /// Create a poller with default HTTP client.
    pub fn new(base_url: &str, config: StatusConfig) -> Result<Self, StatusError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| StatusError::ConnectionFailed(e.to_string()))?;

        Self::with_client(base_url, config, client)
    }

    /// Create a poller with custom HTTP client (for testing).
    pub fn with_client(
        base_url: &str,
        config: StatusConfig,
        client: reqwest::Client,
    ) -> Result<Self, StatusError> {
        reqwest::Url::parse(base_url).map_err(|e| StatusError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            config,
            board: StatusBoard::new(),
        })
    }

    /// Shared handle to the board this poller publishes to.
    pub fn board(&self) -> StatusBoard {
        self.board.clone()
    }

    fn worker_url(&self, worker_id: u32) -> String {
        format!("{}/api/workers/{}/network_status", self.base_url, worker_id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, StatusError> {
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .send()
            .await
            .map_err(|e| StatusError::classify(e, self.config.timeout_seconds))?;

        if !response.status().is_success() {
            return Err(StatusError::HttpError(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StatusError::ParseError(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| StatusError::ParseError(e.to_string()))
    }

    /// Fetch one worker's network status.
    pub async fn fetch_worker(&self, worker_id: u32) -> Result<NetworkStatus, StatusError> {
        let result = self.get_json(&self.worker_url(worker_id)).await;
        if let Err(e) = &result {
            tracing::debug!(worker_id, error = %e, "Worker status request failed");
        }
        result
    }

    /// Fetch every configured worker concurrently.
    ///
    /// Results follow the configured worker order. Any single failure fails
    /// the whole cycle.
    pub async fn fetch_all(&self) -> Result<Vec<NetworkStatus>, StatusError> {
        try_join_all(self.config.workers.iter().map(|&id| self.fetch_worker(id))).await
    }

    /// Run one poll cycle and publish the result.
    ///
    /// Returns whether the board was updated. On failure the previous
    /// snapshot is left in place.
    pub async fn refresh(&self) -> bool {
        let start = Instant::now();
        let result = self.fetch_all().await;
        metrics::histogram!("dllama_status_poll_seconds").record(start.elapsed().as_secs_f64());

        match result {
            Ok(statuses) => {
                tracing::debug!(workers = statuses.len(), "Network status refreshed");
                self.board.replace(statuses);
                true
            }
            Err(e) => {
                metrics::counter!("dllama_status_poll_failures_total").increment(1);
                tracing::error!(error = %e, "Error fetching network status");
                false
            }
        }
    }

    /// Fetch the backend's aggregated worker availability list.
    pub async fn fetch_availability(&self) -> Result<Vec<WorkerAvailability>, StatusError> {
        let url = format!("{}/api/workers/status", self.base_url);
        self.get_json(&url).await
    }

    /// Fetch per-worker performance metrics with the cluster summary.
    pub async fn fetch_performance(&self) -> Result<PerformanceReport, StatusError> {
        let url = format!("{}/api/performance/metrics", self.base_url);
        self.get_json(&url).await
    }

    /// Fetch inference server state and the per-worker status map.
    pub async fn fetch_system(&self) -> Result<SystemStatus, StatusError> {
        let url = format!("{}/api/system/status", self.base_url);
        self.get_json(&url).await
    }

    /// Start the poller background task.
    ///
    /// The first poll runs immediately. Returns a JoinHandle that resolves
    /// when the token is cancelled.
    pub fn start(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(self.config.interval_seconds));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!(
                interval_seconds = self.config.interval_seconds,
                workers = ?self.config.workers,
                "Status poller started"
            );

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Status poller shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        self.refresh().await;
                    }
                }
            }
        })
    }
}
