//! Type-erased backend handle.
//!
//! [`LlmProvider`] returns `impl Future` and so cannot be a trait object.
//! [`ErasedProvider`] is its object-safe mirror, implemented for every
//! provider, and [`BoxLlmProvider`] is the owned handle the reply engines use.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use chatflow_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities};

use super::provider::{LlmEventStream, LlmProvider};

type BoxedCompletion<'a> =
    Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;

pub trait ErasedProvider: Send + Sync {
    fn erased_name(&self) -> &str;

    fn erased_capabilities(&self) -> &ProviderCapabilities;

    fn erased_complete<'a>(&'a self, request: &'a CompletionRequest) -> BoxedCompletion<'a>;

    fn erased_stream(&self, request: CompletionRequest) -> LlmEventStream;
}

impl<P: LlmProvider> ErasedProvider for P {
    fn erased_name(&self) -> &str {
        self.name()
    }

    fn erased_capabilities(&self) -> &ProviderCapabilities {
        self.capabilities()
    }

    fn erased_complete<'a>(&'a self, request: &'a CompletionRequest) -> BoxedCompletion<'a> {
        Box::pin(self.complete(request))
    }

    fn erased_stream(&self, request: CompletionRequest) -> LlmEventStream {
        self.stream(request)
    }
}

/// The configured generation backend.
///
/// Built once at start-up; the engines and the HTTP server share it behind
/// an `Arc`.
pub struct BoxLlmProvider(Box<dyn ErasedProvider>);

impl BoxLlmProvider {
    pub fn new<P: LlmProvider + 'static>(provider: P) -> Self {
        Self(Box::new(provider))
    }

    pub fn name(&self) -> &str {
        self.0.erased_name()
    }

    pub fn capabilities(&self) -> &ProviderCapabilities {
        self.0.erased_capabilities()
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.0.erased_complete(request).await
    }

    pub fn stream(&self, request: CompletionRequest) -> LlmEventStream {
        self.0.erased_stream(request)
    }
}

impl fmt::Debug for BoxLlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoxLlmProvider").field(&self.name()).finish()
    }
}
