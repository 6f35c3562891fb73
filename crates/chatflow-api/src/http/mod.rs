//! HTTP transport for ChatFlow.
//!
//! Axum-based API at `/api/v1/` with the envelope response format, SSE
//! delivery for streaming deployments, and CORS support.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
