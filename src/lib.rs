//! dllama - terminal console for a distributed-llama inference backend
//!
//! This library provides the streaming chat client and the worker
//! network-status poller behind the `dllama` binary.

pub mod chat;
pub mod cli;
pub mod config;
pub mod logging;
pub mod status;
