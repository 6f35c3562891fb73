//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use chatflow_core::transport::InvalidMessage;
use chatflow_types::error::SessionError;

/// Application-level error that maps to HTTP responses.
///
/// Turn failures never show up here: the transport action replaces them with
/// the apology reply. Only requests that never reach the engine do.
#[derive(Debug)]
pub enum AppError {
    /// The request body was rejected before the turn started.
    Validation(String),
    /// Session id handling failed.
    Session(SessionError),
    /// Generic internal error.
    Internal(String),
}

impl From<InvalidMessage> for AppError {
    fn from(e: InvalidMessage) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Session(SessionError::InvalidId(id)) => (
                StatusCode::BAD_REQUEST,
                "INVALID_SESSION_ID",
                format!("Invalid session id '{id}'"),
            ),
            AppError::Session(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SESSION_ERROR", e.to_string())
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
