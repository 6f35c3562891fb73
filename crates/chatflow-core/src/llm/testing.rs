//! Scripted provider shared by the in-crate tests.

use std::future::Future;
use std::sync::{Arc, Mutex};

use chatflow_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason,
    StreamEvent, Usage,
};

use super::provider::{LlmEventStream, LlmProvider};

#[derive(Clone)]
enum Script {
    /// Every call succeeds; `complete` returns the concatenation.
    Fragments(Vec<String>),
    /// Like `Fragments`, with a usage report between the text and the stop.
    FragmentsWithUsage(Vec<String>),
    /// Every call fails before producing text.
    Fail(String),
    /// Stream yields these fragments, then errors. `complete` fails.
    FailAfter(Vec<String>),
}

pub(crate) struct ScriptedProvider {
    script: Script,
    capabilities: ProviderCapabilities,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            capabilities: ProviderCapabilities {
                streaming: true,
                max_context_tokens: 32_000,
                max_output_tokens: 4_096,
            },
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn replying(text: &str) -> Self {
        Self::with_script(Script::Fragments(vec![text.to_string()]))
    }

    pub(crate) fn streaming(fragments: &[&str]) -> Self {
        Self::with_script(Script::Fragments(
            fragments.iter().map(|f| f.to_string()).collect(),
        ))
    }

    pub(crate) fn streaming_with_usage(fragments: &[&str]) -> Self {
        Self::with_script(Script::FragmentsWithUsage(
            fragments.iter().map(|f| f.to_string()).collect(),
        ))
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self::with_script(Script::Fail(message.to_string()))
    }

    pub(crate) fn failing_after(fragments: &[&str]) -> Self {
        Self::with_script(Script::FailAfter(
            fragments.iter().map(|f| f.to_string()).collect(),
        ))
    }

    pub(crate) fn without_streaming(mut self) -> Self {
        self.capabilities.streaming = false;
        self
    }

    pub(crate) fn with_max_output_tokens(mut self, limit: u32) -> Self {
        self.capabilities.max_output_tokens = limit;
        self
    }

    /// Handle on every request this provider has received.
    pub(crate) fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }

    fn record(&self, request: CompletionRequest) {
        self.requests.lock().unwrap().push(request);
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        self.record(request.clone());
        let script = self.script.clone();
        async move {
            match script {
                Script::Fragments(parts) | Script::FragmentsWithUsage(parts) => Ok(CompletionResponse {
                    id: "resp-scripted".to_string(),
                    content: parts.concat(),
                    model: "scripted-model".to_string(),
                    stop_reason: StopReason::EndTurn,
                    usage: Usage {
                        input_tokens: 12,
                        output_tokens: 3,
                    },
                }),
                Script::Fail(message) => Err(LlmError::Provider { message }),
                Script::FailAfter(_) => Err(LlmError::Stream("connection reset".to_string())),
            }
        }
    }

    fn stream(&self, request: CompletionRequest) -> LlmEventStream {
        self.record(request);
        let script = self.script.clone();
        Box::pin(async_stream::stream! {
            match script {
                Script::Fragments(parts) => {
                    yield Ok(StreamEvent::Connected);
                    for text in parts {
                        yield Ok(StreamEvent::TextDelta { text });
                    }
                    yield Ok(StreamEvent::MessageDelta { stop_reason: StopReason::EndTurn });
                    yield Ok(StreamEvent::Done);
                }
                Script::FragmentsWithUsage(parts) => {
                    yield Ok(StreamEvent::Connected);
                    for text in parts {
                        yield Ok(StreamEvent::TextDelta { text });
                    }
                    yield Ok(StreamEvent::Usage(Usage { input_tokens: 12, output_tokens: 2 }));
                    yield Ok(StreamEvent::MessageDelta { stop_reason: StopReason::EndTurn });
                    yield Ok(StreamEvent::Done);
                }
                Script::Fail(message) => {
                    yield Err(LlmError::Provider { message });
                }
                Script::FailAfter(parts) => {
                    yield Ok(StreamEvent::Connected);
                    for text in parts {
                        yield Ok(StreamEvent::TextDelta { text });
                    }
                    yield Err(LlmError::Stream("connection reset".to_string()));
                }
            }
        })
    }
}
