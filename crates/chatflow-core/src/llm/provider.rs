//! LlmProvider trait definition.
//!
//! Every generation backend implements this. `complete` uses RPITIT and
//! `stream` returns `Pin<Box<dyn Stream>>` so the trait stays usable behind
//! [`super::box_provider::BoxLlmProvider`].

use std::pin::Pin;

use futures_util::Stream;

use chatflow_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StreamEvent,
};

/// Boxed stream of provider events.
pub type LlmEventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

/// Trait for generation backends (Gemini, OpenAI, etc.).
///
/// Implementations live in chatflow-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;

    /// Send a streaming completion request. Returns a stream of events.
    fn stream(&self, request: CompletionRequest) -> LlmEventStream;
}
