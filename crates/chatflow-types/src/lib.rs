//! Shared domain types for ChatFlow.
//!
//! This crate contains the data shapes used across the workspace: chat
//! messages, LLM request/response/stream types, generation settings, the
//! intent response table, global configuration, and error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod generation;
pub mod intent;
pub mod llm;
