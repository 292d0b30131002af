//! Incremental server-sent-events framing.
//!
//! Only `data` fields matter to the chat client; `event`, `id`, `retry` and
//! comment lines are skipped.

/// Splits a byte stream into SSE `data` payloads.
///
/// Bytes are buffered until a full line is available, so chunk boundaries may
/// fall anywhere, including inside a multi-byte UTF-8 sequence.
#[derive(Debug, Default)]
pub struct SseDecoder {
    line_buf: Vec<u8>,
    data: String,
    has_data: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns every event payload completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut events = Vec::new();
        self.line_buf.extend_from_slice(chunk);

        while let Some(pos) = self.line_buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.line_buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);

            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }

        events
    }

    /// Flush at end of stream.
    ///
    /// An unterminated final line and any undispatched data are emitted rather
    /// than dropped, so a body ending in `data: [DONE]` without a blank line
    /// still completes.
    pub fn finish(mut self) -> Vec<String> {
        let mut events = Vec::new();

        if !self.line_buf.is_empty() {
            let mut rest = std::mem::take(&mut self.line_buf);
            if rest.last() == Some(&b'\r') {
                rest.pop();
            }
            let line = String::from_utf8_lossy(&rest).into_owned();
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }

        if let Some(event) = self.dispatch() {
            events.push(event);
        }

        events
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        if field == "data" {
            if self.has_data {
                self.data.push('\n');
            }
            self.data.push_str(value);
            self.has_data = true;
        }

        None
    }

    /// An event with a `data` field is dispatched even when the value is empty.
    fn dispatch(&mut self) -> Option<String> {
        let data = std::mem::take(&mut self.data);
        std::mem::replace(&mut self.has_data, false).then_some(data)
    }
}
