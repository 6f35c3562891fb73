//! Response pipeline: turns one user turn into a reply from the backend.
//!
//! The pipeline composes the prompt with [`prompt::PromptBuilder`], makes
//! exactly one backend call, and normalizes every backend failure into a
//! [`GenerationError`]. Whether replies are buffered or streamed is fixed
//! when the pipeline is constructed.

pub mod prompt;
mod span;

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tracing::{Instrument, debug, info_span, warn};

use chatflow_types::generation::{GenerationConfig, GenerationError, GenerationRequest};
use chatflow_types::llm::{CompletionRequest, PromptMessage, StreamEvent};

use crate::llm::box_provider::BoxLlmProvider;

use self::prompt::PromptBuilder;
use self::span::StreamInSpan;

/// Lazy, single-pass sequence of text fragments.
///
/// Fragments carry no boundary guarantees; only their in-order
/// concatenation is meaningful.
pub type FragmentStream = Pin<Box<dyn Stream<Item = String> + Send + 'static>>;

/// What a turn produces: one finished string or a fragment stream.
pub enum Reply {
    Complete(String),
    Stream(FragmentStream),
}

impl Reply {
    /// A stream that yields `text` once and ends.
    pub fn one_shot(text: impl Into<String>) -> Self {
        Reply::Stream(Box::pin(futures_util::stream::once(std::future::ready(
            text.into(),
        ))))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Reply::Stream(_))
    }

    /// Drain the reply into a single string.
    pub async fn into_text(self) -> String {
        match self {
            Reply::Complete(text) => text,
            Reply::Stream(fragments) => fragments.collect::<Vec<_>>().await.concat(),
        }
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Complete(text) => f.debug_tuple("Complete").field(text).finish(),
            Reply::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// How the generative pipeline delivers its replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Buffered,
    Streaming,
}

/// Prompt construction plus one backend call per turn.
pub struct ResponsePipeline {
    provider: Arc<BoxLlmProvider>,
    config: GenerationConfig,
    delivery: DeliveryMode,
}

impl ResponsePipeline {
    pub fn new(
        provider: Arc<BoxLlmProvider>,
        config: GenerationConfig,
        delivery: DeliveryMode,
    ) -> Self {
        let mut config = config.normalized();
        let ceiling = provider.capabilities().max_output_tokens;
        if config.max_tokens > ceiling {
            debug!(
                requested = config.max_tokens,
                ceiling, "max_tokens above backend output limit, clamping"
            );
            config.max_tokens = ceiling;
        }
        Self {
            provider,
            config,
            delivery,
        }
    }

    pub fn delivery(&self) -> DeliveryMode {
        self.delivery
    }

    /// Generate a reply in this pipeline's delivery mode.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Reply, GenerationError> {
        match self.delivery {
            DeliveryMode::Buffered => self.generate_text(request).await.map(Reply::Complete),
            DeliveryMode::Streaming => self.generate_stream(request).await.map(Reply::Stream),
        }
    }

    /// Await the full completion.
    ///
    /// An empty completion is a failure.
    pub async fn generate_text(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        let completion = self.build_request(request, false);

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.max_tokens = completion.max_tokens,
            gen_ai.request.temperature = ?completion.temperature,
            gen_ai.request.stream = false,
        );

        let response = self.provider.complete(&completion).instrument(span).await?;

        debug!(
            model = %response.model,
            stop_reason = ?response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "completion received"
        );

        if response.content.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(response.content)
    }

    /// Start a streaming completion.
    ///
    /// Waits for the first non-empty fragment before returning, so a backend
    /// that fails (or finishes silently) up front surfaces as an error. Once
    /// fragments have flowed, a later backend error just ends the stream.
    pub async fn generate_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<FragmentStream, GenerationError> {
        let completion = self.build_request(request, true);

        let span = info_span!(
            "gen_ai.stream",
            gen_ai.system = self.provider.name(),
            gen_ai.request.max_tokens = completion.max_tokens,
            gen_ai.request.temperature = ?completion.temperature,
            gen_ai.request.stream = true,
        );

        let mut events = StreamInSpan::new(self.provider.stream(completion), span);

        let first = loop {
            match events.next().await {
                Some(Ok(StreamEvent::TextDelta { text })) if !text.is_empty() => break text,
                Some(Ok(StreamEvent::Done)) | None => {
                    return Err(GenerationError::EmptyResponse);
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
            }
        };

        let fragments = async_stream::stream! {
            yield first;
            while let Some(event) = events.next().await {
                match event {
                    Ok(StreamEvent::TextDelta { text }) => {
                        if !text.is_empty() {
                            yield text;
                        }
                    }
                    Ok(StreamEvent::MessageDelta { stop_reason }) => {
                        debug!(?stop_reason, "stream finishing");
                    }
                    Ok(StreamEvent::Usage(usage)) => {
                        debug!(
                            input_tokens = usage.input_tokens,
                            output_tokens = usage.output_tokens,
                            "stream usage reported"
                        );
                    }
                    Ok(StreamEvent::Done) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "stream interrupted, truncating reply");
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(fragments))
    }

    /// Build the backend request for one turn.
    pub fn build_request(&self, request: &GenerationRequest, stream: bool) -> CompletionRequest {
        CompletionRequest {
            model: String::new(),
            messages: vec![PromptMessage::user(PromptBuilder::compose(
                &request.message,
                &request.history,
            ))],
            system: None,
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            stream,
        }
    }
}
