//! Stub backend for the binary's tests.

use std::future::Future;

use chatflow_core::llm::box_provider::BoxLlmProvider;
use chatflow_core::llm::provider::{LlmEventStream, LlmProvider};
use chatflow_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason,
    StreamEvent, Usage,
};

/// Replies with fixed fragments, or fails every call.
pub(crate) struct StubProvider {
    fragments: Option<Vec<String>>,
    capabilities: ProviderCapabilities,
}

impl StubProvider {
    pub(crate) fn fragments(fragments: &[&str]) -> BoxLlmProvider {
        BoxLlmProvider::new(Self {
            fragments: Some(fragments.iter().map(|f| f.to_string()).collect()),
            capabilities: capabilities(),
        })
    }

    /// Replies with `text`, but only through the buffered call.
    pub(crate) fn buffered_only(text: &str) -> BoxLlmProvider {
        BoxLlmProvider::new(Self {
            fragments: Some(vec![text.to_string()]),
            capabilities: ProviderCapabilities {
                streaming: false,
                ..capabilities()
            },
        })
    }

    pub(crate) fn failing() -> BoxLlmProvider {
        BoxLlmProvider::new(Self {
            fragments: None,
            capabilities: capabilities(),
        })
    }
}

fn capabilities() -> ProviderCapabilities {
    ProviderCapabilities {
        streaming: true,
        max_context_tokens: 32_000,
        max_output_tokens: 4_096,
    }
}

impl LlmProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    fn complete(
        &self,
        _request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        let result = match &self.fragments {
            Some(fragments) => Ok(CompletionResponse {
                id: "stub-1".to_string(),
                content: fragments.concat(),
                model: "stub".to_string(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            }),
            None => Err(LlmError::Provider {
                message: "stub backend down".to_string(),
            }),
        };
        std::future::ready(result)
    }

    fn stream(&self, _request: CompletionRequest) -> LlmEventStream {
        let fragments = self.fragments.clone();
        Box::pin(async_stream::stream! {
            match fragments {
                Some(fragments) => {
                    yield Ok(StreamEvent::Connected);
                    for text in fragments {
                        yield Ok(StreamEvent::TextDelta { text });
                    }
                    yield Ok(StreamEvent::Done);
                }
                None => {
                    yield Err(LlmError::Stream("stub backend down".to_string()));
                }
            }
        })
    }
}
