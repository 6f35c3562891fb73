use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;

use chatflow_types::llm::{LlmError, StreamEvent};

use crate::llm::provider::LlmEventStream;

/// Keeps a tracing span entered for every poll of a provider stream.
///
/// The span lives as long as the stream, so the `gen_ai.*` span covers the
/// whole response rather than just the call that started it.
pub(crate) struct StreamInSpan {
    inner: LlmEventStream,
    span: tracing::Span,
}

impl StreamInSpan {
    pub(crate) fn new(inner: LlmEventStream, span: tracing::Span) -> Self {
        Self { inner, span }
    }
}

impl Stream for StreamInSpan {
    type Item = Result<StreamEvent, LlmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // `inner` is already boxed and pinned, so `Self: Unpin`.
        let this = self.get_mut();
        let _enter = this.span.enter();
        this.inner.as_mut().poll_next(cx)
    }
}
