//! Infrastructure layer for ChatFlow.
//!
//! Implements the ports defined in `chatflow-core`: the OpenAI-compatible
//! generation backend and the file-backed client store. Also loads the
//! deployment configuration, API keys and the intent table.

pub mod client_store;
pub mod config;
pub mod intent_table;
pub mod llm;
pub mod secret;
