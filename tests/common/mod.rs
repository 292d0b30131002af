//! Shared test utilities for the dllama integration tests.
//!
//! Builders for SSE bodies and worker status payloads served by wiremock.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// SSE body with one `{"text": ...}` event per token, optionally ending in `[DONE]`.
pub fn sse_body(tokens: &[&str], include_done: bool) -> String {
    let mut body = String::new();
    for token in tokens {
        body.push_str(&format!("data: {}\n\n", json!({ "text": token })));
    }
    if include_done {
        body.push_str("data: [DONE]\n\n");
    }
    body
}

/// SSE response template with the right content type.
pub fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/event-stream")
}

/// Network status payload for one worker.
pub fn network_status_json(worker_id: u32, latency_ms: f64) -> Value {
    json!({
        "worker_id": worker_id,
        "backend_latency_ms": latency_ms,
        "network_stats": {
            "dropin": 0,
            "dropout": worker_id,
            "bytes_recv": 1024 * worker_id,
            "bytes_sent": 512
        }
    })
}

/// Mount healthy network status endpoints for `workers`.
pub async fn mount_workers(server: &MockServer, workers: &[u32], latency_ms: f64) {
    for &id in workers {
        Mock::given(method("GET"))
            .and(path(format!("/api/workers/{}/network_status", id)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(network_status_json(id, latency_ms)),
            )
            .mount(server)
            .await;
    }
}
