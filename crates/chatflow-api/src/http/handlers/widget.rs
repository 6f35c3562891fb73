//! Widget bootstrap endpoint.
//!
//! GET /api/v1/widget - Tells a web client which reply shape to expect and
//! what greeting opens a new conversation.

use std::time::Instant;

use axum::extract::State;
use serde::Serialize;

use chatflow_types::generation::DeploymentMode;

use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WidgetInfo {
    pub mode: DeploymentMode,
    /// True when `/chat` answers with Server-Sent Events.
    pub streaming: bool,
    pub greeting: String,
}

/// GET /api/v1/widget - Deployment mode and greeting.
pub async fn widget_info(State(state): State<AppState>) -> ApiResponse<WidgetInfo> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let mode = state.transport.mode();
    let info = WidgetInfo {
        mode,
        streaming: mode.is_streaming(),
        greeting: state.config.greeting.clone(),
    };

    ApiResponse::success(info, request_id, start.elapsed().as_millis() as u64)
        .with_link("chat", "/api/v1/chat")
}
