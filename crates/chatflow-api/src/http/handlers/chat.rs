//! Chat turn endpoint.
//!
//! POST /api/v1/chat - Run one turn through the transport action.
//!
//! Buffered and intent deployments answer with the JSON envelope. Streaming
//! deployments answer with Server-Sent Events:
//!
//! - `fragment` `{"text": "..."}` for every text fragment, in order
//! - `done` `{}` once the reply is finished

use std::convert::Infallible;
use std::time::{Duration, Instant};

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use chatflow_core::pipeline::{FragmentStream, Reply};
use chatflow_core::transport::validate_message;
use chatflow_types::chat::{ChatMessage, SessionId};
use chatflow_types::error::SessionError;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for a chat turn.
#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    /// The client's persisted session id.
    pub session_id: String,
    pub message: String,
    /// Everything said before `message`, greeting included.
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

/// `data` payload of a buffered reply.
#[derive(Debug, Serialize)]
pub struct CompleteReply {
    pub kind: &'static str,
    pub text: String,
}

/// POST /api/v1/chat - Run one chat turn.
pub async fn chat_turn(
    State(state): State<AppState>,
    Json(body): Json<ChatTurnRequest>,
) -> Result<Response, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    validate_message(&body.message)?;
    if body.session_id.trim().is_empty() {
        return Err(SessionError::InvalidId(body.session_id).into());
    }
    let session_id = SessionId(body.session_id);

    let reply = state
        .transport
        .handle(&session_id, &body.message, &body.history)
        .await;

    match reply {
        Reply::Complete(text) => {
            let data = CompleteReply {
                kind: "complete",
                text,
            };
            let elapsed = start.elapsed().as_millis() as u64;
            Ok(ApiResponse::success(data, request_id, elapsed).into_response())
        }
        Reply::Stream(fragments) => Ok(Sse::new(fragment_events(fragments))
            .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
            .into_response()),
    }
}

/// Forward fragments as `fragment` events, then close with `done`.
fn fragment_events(
    mut fragments: FragmentStream,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        while let Some(text) = fragments.next().await {
            let data = serde_json::json!({ "text": text }).to_string();
            yield Ok::<_, Infallible>(Event::default().event("fragment").data(data));
        }
        yield Ok(Event::default().event("done").data("{}"));
    }
}
