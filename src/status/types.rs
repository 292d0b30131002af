//! Wire types returned by the worker status endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Packet and byte counters for one worker's network link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkStats {
    pub dropin: u64,
    pub dropout: u64,
    pub bytes_recv: u64,
    pub bytes_sent: u64,
}

impl NetworkStats {
    /// Packets dropped in either direction.
    pub fn packet_loss(&self) -> u64 {
        self.dropin.saturating_add(self.dropout)
    }
}

/// `GET /api/workers/{n}/network_status` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub worker_id: u32,
    /// Zero or negative when the backend has no measurement
    #[serde(default)]
    pub backend_latency_ms: f64,
    pub network_stats: NetworkStats,
}

/// One entry of `GET /api/workers/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerAvailability {
    pub worker_id: u32,
    /// `online`, `offline`, or `error: ...` when the backend couldn't reach it
    pub status: String,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<f64>,
}

/// `GET /api/performance/metrics` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub system: PerformanceSummary,
    #[serde(default)]
    pub worker_metrics: Vec<WorkerMetrics>,
}

/// Cluster-wide counters attached to a performance report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_workers: u32,
    pub active_workers: u32,
    /// Unix seconds when the backend built the report
    pub timestamp: f64,
}

impl PerformanceSummary {
    pub fn collected_at(&self) -> Option<DateTime<Utc>> {
        if !self.timestamp.is_finite() || self.timestamp < 0.0 {
            return None;
        }
        let secs = self.timestamp.trunc() as i64;
        let nanos = (self.timestamp.fract() * 1e9) as u32;
        DateTime::from_timestamp(secs, nanos)
    }
}

/// One worker's entry in a performance report.
///
/// Healthy workers report whatever their `/metrics` endpoint returns; the
/// backend substitutes `{"worker_id", "status": "error", "error"}` for
/// workers it couldn't reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Remaining worker-reported fields, kept as-is
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl WorkerMetrics {
    /// Matches how the backend counts active workers.
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}

/// `GET /api/system/status` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// `running` or `stopped`
    pub server_status: String,
    pub total_workers: u32,
    pub available_workers: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer_path: Option<String>,
    /// Keyed by worker id as a string
    #[serde(default)]
    pub worker_status: BTreeMap<String, WorkerAvailability>,
}

impl SystemStatus {
    /// Worker entries ordered by worker id.
    pub fn workers(&self) -> Vec<&WorkerAvailability> {
        let mut workers: Vec<_> = self.worker_status.values().collect();
        workers.sort_by_key(|w| w.worker_id);
        workers
    }
}
