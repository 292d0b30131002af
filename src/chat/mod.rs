//! Streaming chat client.
//!
//! A [`ChatSession`] sends prompts to the backend's SSE completion endpoint
//! through a [`CompletionSource`] and renders tokens into the assistant
//! message as they arrive. Timing metrics are attached once the stream sends
//! the `[DONE]` sentinel.

mod client;
mod error;
mod event;
mod message;
mod session;
mod sse;

pub use client::{
    CompletionSource, EventStream, GenerateRequest, GenerateResponse, HttpCompletionClient,
};
pub use error::ChatError;
pub use event::{StreamEvent, TokenFragment, DONE_SENTINEL};
pub use message::{ChatMessage, MessageId, MessageMetrics, Role};
pub use session::{ChatSession, ReplyProgress, ReplyTracker, SubmitOutcome};
pub use sse::SseDecoder;
