//! Interpretation of a single SSE payload from the completion stream.

use serde_json::Value;

/// Payload that ends a completion stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One decoded stream event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// End of the reply
    Done,
    /// JSON payload with an optional token and timing fields
    Fragment(TokenFragment),
    /// Payload that isn't usable JSON; its text is appended as-is
    Raw(String),
}

/// Fields carried by a JSON stream payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenFragment {
    pub text: Option<String>,
    /// Seconds
    pub ttft: Option<f64>,
    /// Seconds
    pub total_delay: Option<f64>,
}

impl StreamEvent {
    /// Classify an SSE `data` payload.
    ///
    /// JSON `null` is treated like unparseable input. Other non-object JSON
    /// values carry nothing and produce an empty fragment.
    pub fn parse(data: &str) -> Self {
        if data == DONE_SENTINEL {
            return StreamEvent::Done;
        }

        match serde_json::from_str::<Value>(data) {
            Ok(Value::Object(fields)) => StreamEvent::Fragment(TokenFragment {
                text: fields
                    .get("text")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                ttft: fields.get("ttft").and_then(Value::as_f64),
                total_delay: fields.get("total_delay").and_then(Value::as_f64),
            }),
            Ok(Value::Null) | Err(_) => StreamEvent::Raw(data.to_string()),
            Ok(_) => StreamEvent::Fragment(TokenFragment::default()),
        }
    }
}
