//! Output formatting helpers for CLI commands

use crate::chat::{ChatMessage, MessageMetrics};
use crate::status::{
    is_latency_high, latency_label, network_io_label, packet_loss_label, NetworkStatus,
    PerformanceReport, SystemStatus, WorkerAvailability, WorkerMetrics,
};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// Shown when an interactive session starts with no messages.
pub const GREETING: &str = "Hi there! How can we help? Ask me anything to get started.";

/// Shown before the first status snapshot arrives.
pub const LOADING_STATUS: &str = "Loading network status...";

/// One-line metrics footer for a completed reply.
pub fn format_metrics(metrics: &MessageMetrics) -> String {
    format!(
        "TTFT: {:.2}s | Tokens: {} | Time: {:.2}s | Delay: {:.2}s",
        metrics.ttft, metrics.token_count, metrics.generation_time, metrics.total_delay
    )
}

/// Format a chat transcript as JSON
pub fn format_transcript_json(messages: &[ChatMessage]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "messages": messages }))
}

/// Format worker network status as a table
pub fn format_status_table(statuses: &[NetworkStatus]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Worker", "Backend Latency", "Packet Loss", "Network I/O"]);

    for s in statuses {
        let latency = latency_label(s.backend_latency_ms);
        let latency = if is_latency_high(s.backend_latency_ms) {
            latency.red().to_string()
        } else {
            latency.green().to_string()
        };

        table.add_row(vec![
            Cell::new(format!("Worker {}", s.worker_id)),
            Cell::new(latency),
            Cell::new(packet_loss_label(&s.network_stats)),
            Cell::new(network_io_label(&s.network_stats)),
        ]);
    }

    table.to_string()
}

/// Format worker network status as JSON
pub fn format_status_json(statuses: &[NetworkStatus]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "workers": statuses }))
}

/// Format worker availability as a table
pub fn format_availability_table(workers: &[WorkerAvailability]) -> String {
    availability_table(workers).to_string()
}

fn availability_table<'a>(workers: impl IntoIterator<Item = &'a WorkerAvailability>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Worker", "Status", "Available", "Uptime"]);

    for w in workers {
        let available = if w.is_available {
            "✓".green().to_string()
        } else {
            "✗".red().to_string()
        };
        let uptime = w
            .uptime_seconds
            .map(|s| format_duration(s as u64))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(format!("Worker {}", w.worker_id)),
            Cell::new(&w.status),
            Cell::new(available),
            Cell::new(uptime),
        ]);
    }

    table
}

/// Format worker availability as JSON
pub fn format_availability_json(
    workers: &[WorkerAvailability],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "workers": workers }))
}

/// Format a performance report as a summary line and a table
pub fn format_performance_table(report: &PerformanceReport) -> String {
    let summary = &report.system;
    let collected = summary
        .collected_at()
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Worker", "Status", "Metrics"]);

    for m in &report.worker_metrics {
        let worker = m
            .worker_id
            .map(|id| format!("Worker {}", id))
            .unwrap_or_else(|| "-".to_string());
        let status = if m.is_error() {
            "error".red().to_string()
        } else {
            m.status.as_deref().unwrap_or("ok").green().to_string()
        };

        table.add_row(vec![
            Cell::new(worker),
            Cell::new(status),
            Cell::new(metrics_details(m)),
        ]);
    }

    format!(
        "Active workers: {}/{} (collected {})\n{}",
        summary.active_workers, summary.total_workers, collected, table
    )
}

/// Error text for failed workers, `key=value` pairs otherwise.
fn metrics_details(metrics: &WorkerMetrics) -> String {
    if let Some(error) = &metrics.error {
        return error.clone();
    }
    if metrics.values.is_empty() {
        return "-".to_string();
    }
    metrics
        .values
        .iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(text) => format!("{}={}", key, text),
            other => format!("{}={}", key, other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a performance report as JSON
pub fn format_performance_json(report: &PerformanceReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Format system status as a header block and the worker table
pub fn format_system_table(status: &SystemStatus) -> String {
    let server = if status.server_status == "running" {
        status.server_status.green().to_string()
    } else {
        status.server_status.red().to_string()
    };

    let mut lines = vec![
        format!("Server:    {}", server),
        format!(
            "Workers:   {}/{} available",
            status.available_workers, status.total_workers
        ),
    ];
    if let Some(model) = &status.model_path {
        lines.push(format!("Model:     {}", model));
    }
    if let Some(tokenizer) = &status.tokenizer_path {
        lines.push(format!("Tokenizer: {}", tokenizer));
    }
    lines.push(availability_table(status.workers()).to_string());

    lines.join("\n")
}

/// Format system status as JSON
pub fn format_system_json(status: &SystemStatus) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(status)
}

/// Format duration in a human-readable way
fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
