//! Reply engines, transport boundary and presentation loop for ChatFlow.
//!
//! This crate defines the provider trait and the client-store port that the
//! infrastructure layer implements. It depends only on `chatflow-types` --
//! never on `chatflow-infra` or any network/IO crate.

pub mod conversation;
pub mod intent;
pub mod llm;
pub mod pipeline;
pub mod session;
pub mod transport;
