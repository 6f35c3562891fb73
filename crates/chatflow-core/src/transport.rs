//! Transport action: the boundary every client calls for a turn.
//!
//! `TransportAction::handle` never fails. Whatever goes wrong inside the
//! reply engine is logged and replaced with the configured apology, shaped
//! like a normal reply for the deployment.

use std::sync::Arc;

use tracing::{error, info};

use chatflow_types::chat::{ChatMessage, SessionId};
use chatflow_types::generation::{
    DeploymentMode, GenerationConfig, GenerationError, GenerationRequest,
};
use chatflow_types::intent::IntentTable;

use crate::intent::IntentResponder;
use crate::llm::box_provider::BoxLlmProvider;
use crate::pipeline::{DeliveryMode, Reply, ResponsePipeline};

/// The reply engine a deployment runs. Fixed at start-up.
pub enum TurnEngine {
    Generative(ResponsePipeline),
    Intent(IntentResponder),
}

impl TurnEngine {
    /// Generative engine for the buffered or streaming deployment modes.
    ///
    /// `DeploymentMode::Intent` needs a table; use [`TurnEngine::intent`].
    /// Streaming is refused for a backend that cannot stream.
    pub fn generative(
        provider: Arc<BoxLlmProvider>,
        config: GenerationConfig,
        streaming: bool,
    ) -> Result<Self, EngineError> {
        let delivery = if streaming {
            if !provider.capabilities().streaming {
                return Err(EngineError::StreamingUnsupported(provider.name().to_string()));
            }
            DeliveryMode::Streaming
        } else {
            DeliveryMode::Buffered
        };
        Ok(TurnEngine::Generative(ResponsePipeline::new(provider, config, delivery)))
    }

    pub fn intent(provider: Arc<BoxLlmProvider>, table: Arc<IntentTable>) -> Self {
        TurnEngine::Intent(IntentResponder::new(provider, table))
    }

    pub fn mode(&self) -> DeploymentMode {
        match self {
            TurnEngine::Generative(pipeline) => match pipeline.delivery() {
                DeliveryMode::Buffered => DeploymentMode::Buffered,
                DeliveryMode::Streaming => DeploymentMode::Streaming,
            },
            TurnEngine::Intent(_) => DeploymentMode::Intent,
        }
    }

    async fn reply(&self, request: &GenerationRequest) -> Result<Reply, GenerationError> {
        match self {
            TurnEngine::Generative(pipeline) => pipeline.generate(request).await,
            TurnEngine::Intent(responder) => {
                responder.respond(&request.message).await.map(Reply::Complete)
            }
        }
    }
}

/// The configured engine cannot run on the configured backend.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("backend '{0}' does not support streaming replies")]
    StreamingUnsupported(String),
}

/// Rejection for input that must never reach the engine.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidMessage {
    #[error("message must not be empty")]
    Empty,
}

/// Check that `message` has content after trimming.
pub fn validate_message(message: &str) -> Result<(), InvalidMessage> {
    if message.trim().is_empty() {
        return Err(InvalidMessage::Empty);
    }
    Ok(())
}

pub struct TransportAction {
    engine: TurnEngine,
    fallback_message: String,
}

impl TransportAction {
    pub fn new(engine: TurnEngine, fallback_message: impl Into<String>) -> Self {
        Self {
            engine,
            fallback_message: fallback_message.into(),
        }
    }

    pub fn mode(&self) -> DeploymentMode {
        self.engine.mode()
    }

    /// Run one turn. At most one engine attempt; never returns an error.
    #[tracing::instrument(
        name = "transport.handle",
        skip(self, message, history),
        fields(session_id = %session_id, history_len = history.len())
    )]
    pub async fn handle(
        &self,
        session_id: &SessionId,
        message: &str,
        history: &[ChatMessage],
    ) -> Reply {
        info!("User: {message}");

        let request = GenerationRequest {
            message: message.to_string(),
            history: history.to_vec(),
        };

        match self.engine.reply(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(%session_id, error = %e, "Error processing message");
                self.apology()
            }
        }
    }

    /// The apology in the shape this deployment delivers replies.
    fn apology(&self) -> Reply {
        if self.mode().is_streaming() {
            Reply::one_shot(self.fallback_message.clone())
        } else {
            Reply::Complete(self.fallback_message.clone())
        }
    }
}
