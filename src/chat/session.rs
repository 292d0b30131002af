//! Chat session state: the message list and the reply currently streaming.

use super::client::CompletionSource;
use super::error::ChatError;
use super::event::StreamEvent;
use super::message::{ChatMessage, MessageId, MessageMetrics};
use crate::config::{MAX_MAX_TOKENS, MIN_MAX_TOKENS};
use futures_util::StreamExt;
use std::time::Instant;

/// How a call to [`ChatSession::submit`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank input, or a reply was already in flight
    Ignored,
    /// Reply finished and metrics were attached
    Completed {
        id: MessageId,
        metrics: MessageMetrics,
    },
    /// Reply ended early; partial content is kept, no metrics
    Failed { id: MessageId, error: ChatError },
}

/// What applying one stream event did to the reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyProgress {
    /// Text was appended; carries the new fragment
    Appended(String),
    /// Only timing fields (if anything) changed
    Pending,
    /// End sentinel received
    Finished(MessageMetrics),
}

/// Accumulates one assistant reply from stream events.
#[derive(Debug)]
pub struct ReplyTracker {
    started: Instant,
    content: String,
    metrics: MessageMetrics,
}

impl ReplyTracker {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            content: String::new(),
            metrics: MessageMetrics::default(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metrics(&self) -> &MessageMetrics {
        &self.metrics
    }

    pub fn on_event(&mut self, event: StreamEvent) -> ReplyProgress {
        match event {
            StreamEvent::Done => {
                self.metrics.generation_time = self.started.elapsed().as_secs_f64();
                ReplyProgress::Finished(self.metrics)
            }
            StreamEvent::Fragment(fragment) => {
                // Zero timing values never overwrite earlier ones
                if let Some(ttft) = fragment.ttft.filter(|v| *v != 0.0) {
                    self.metrics.ttft = ttft;
                }
                if let Some(delay) = fragment.total_delay.filter(|v| *v != 0.0) {
                    self.metrics.total_delay = delay;
                }
                match fragment.text {
                    Some(text) if !text.is_empty() => self.append(text),
                    _ => ReplyProgress::Pending,
                }
            }
            StreamEvent::Raw(text) => self.append(text),
        }
    }

    fn append(&mut self, text: String) -> ReplyProgress {
        self.content.push_str(&text);
        self.metrics.token_count += 1;
        ReplyProgress::Appended(text)
    }
}

impl Default for ReplyTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// One conversation. Messages live only as long as the session.
#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    loading: bool,
    max_tokens: u32,
}

impl ChatSession {
    /// `max_tokens` is clamped to the accepted range.
    pub fn new(max_tokens: u32) -> Self {
        Self {
            messages: Vec::new(),
            loading: false,
            max_tokens: max_tokens.clamp(MIN_MAX_TOKENS, MAX_MAX_TOKENS),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn message(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn set_max_tokens(&mut self, max_tokens: u32) {
        self.max_tokens = max_tokens.clamp(MIN_MAX_TOKENS, MAX_MAX_TOKENS);
    }

    /// Send `input` and stream the reply into the session.
    ///
    /// `on_token` sees each appended fragment as it arrives. Failures are
    /// logged and reported in the outcome; nothing is retried.
    pub async fn submit<S, F>(&mut self, source: &S, input: &str, mut on_token: F) -> SubmitOutcome
    where
        S: CompletionSource + ?Sized,
        F: FnMut(&str),
    {
        let Some(id) = self.begin(input) else {
            return SubmitOutcome::Ignored;
        };

        let mut tracker = ReplyTracker::new();
        let mut stream = match source.open_stream(input, self.max_tokens).await {
            Ok(stream) => stream,
            Err(e) => return self.fail(id, e),
        };

        while let Some(item) = stream.next().await {
            let event = match item {
                Ok(event) => event,
                Err(e) => return self.fail(id, e),
            };

            match tracker.on_event(event) {
                ReplyProgress::Appended(fragment) => {
                    on_token(&fragment);
                    self.set_content(id, tracker.content());
                }
                ReplyProgress::Pending => {}
                ReplyProgress::Finished(metrics) => {
                    return self.complete(id, metrics);
                }
            }
        }

        self.fail(id, ChatError::StreamClosed)
    }

    /// Send `input` through the non-streaming endpoint.
    pub async fn submit_blocking<S>(&mut self, source: &S, input: &str) -> SubmitOutcome
    where
        S: CompletionSource + ?Sized,
    {
        let Some(id) = self.begin(input) else {
            return SubmitOutcome::Ignored;
        };

        match source.generate(input, self.max_tokens).await {
            Ok(response) => {
                self.set_content(id, &response.generated_text);
                let metrics = MessageMetrics {
                    token_count: response.total_tokens,
                    generation_time: response.generation_time,
                    ..MessageMetrics::default()
                };
                self.complete(id, metrics)
            }
            Err(e) => self.fail(id, e),
        }
    }

    /// Push the user message and an empty assistant message.
    ///
    /// Returns the assistant message id, or `None` if the input is ignored.
    fn begin(&mut self, input: &str) -> Option<MessageId> {
        if input.trim().is_empty() || self.loading {
            return None;
        }

        self.messages.push(ChatMessage::user(input));
        let reply = ChatMessage::assistant();
        let id = reply.id;
        self.messages.push(reply);
        self.loading = true;

        Some(id)
    }

    fn set_content(&mut self, id: MessageId, content: &str) {
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == id) {
            msg.content = content.to_string();
        }
    }

    fn complete(&mut self, id: MessageId, metrics: MessageMetrics) -> SubmitOutcome {
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == id) {
            msg.metrics = Some(metrics);
        }
        self.loading = false;

        metrics::histogram!("dllama_chat_ttft_seconds").record(metrics.ttft);
        metrics::histogram!("dllama_chat_generation_seconds").record(metrics.generation_time);
        tracing::info!(
            message_id = %id,
            token_count = metrics.token_count,
            generation_time = metrics.generation_time,
            ttft = metrics.ttft,
            "Reply completed"
        );

        SubmitOutcome::Completed { id, metrics }
    }

    fn fail(&mut self, id: MessageId, error: ChatError) -> SubmitOutcome {
        self.loading = false;

        metrics::counter!("dllama_chat_stream_errors_total").increment(1);
        tracing::error!(message_id = %id, error = %error, "Streaming error");

        SubmitOutcome::Failed { id, error }
    }
}
