//! Client presentation loop.
//!
//! `PresentationLoop` owns the conversation for one client, gates input
//! while a turn is in flight, and pushes every visible change to a
//! [`ChatView`]. It is front-end agnostic: the terminal client implements
//! `ChatView`, and so do the tests.

use futures_util::StreamExt;
use tracing::warn;

use chatflow_types::chat::{ChatMessage, SessionId};

use crate::pipeline::Reply;
use crate::transport::{InvalidMessage, TransportAction, validate_message};

use super::Conversation;

/// Whatever renders the conversation.
pub trait ChatView {
    /// Show or hide the loading indicator.
    fn set_loading(&mut self, loading: bool);

    /// Enable or disable the input field.
    fn set_input_enabled(&mut self, enabled: bool);

    /// Re-render the whole conversation.
    fn render(&mut self, conversation: &Conversation);

    /// Return focus to the input field.
    fn focus_input(&mut self);
}

/// Why a submission was refused.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TurnRejected {
    #[error("a reply is still in progress")]
    InFlight,

    #[error(transparent)]
    Invalid(#[from] InvalidMessage),
}

/// A submitted turn waiting for its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub message: String,
    /// The conversation as it was before `message` was appended.
    pub history: Vec<ChatMessage>,
}

pub struct PresentationLoop {
    session_id: SessionId,
    greeting: String,
    conversation: Conversation,
    in_flight: bool,
    loading: bool,
}

impl PresentationLoop {
    pub fn new(session_id: SessionId, greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            session_id,
            conversation: Conversation::with_greeting(greeting.clone()),
            greeting,
            in_flight: false,
            loading: false,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start over from the greeting. Ignored while a turn is in flight.
    pub fn reset(&mut self, view: &mut impl ChatView) {
        if self.in_flight {
            return;
        }
        self.conversation = Conversation::with_greeting(self.greeting.clone());
        view.render(&self.conversation);
    }

    /// Accept a submission: snapshot the history, append the user message,
    /// show loading and lock input.
    pub fn begin_turn(
        &mut self,
        input: &str,
        view: &mut impl ChatView,
    ) -> Result<PendingTurn, TurnRejected> {
        if self.in_flight {
            return Err(TurnRejected::InFlight);
        }
        validate_message(input)?;

        let history = self.conversation.messages().to_vec();
        self.conversation = self.conversation.with_message(ChatMessage::user(input));
        self.in_flight = true;
        self.loading = true;

        view.set_input_enabled(false);
        view.set_loading(true);
        view.render(&self.conversation);

        Ok(PendingTurn {
            message: input.to_string(),
            history,
        })
    }

    /// Feed the reply for the pending turn into the conversation.
    ///
    /// A complete reply lands as one bot message. A stream first lands as an
    /// empty placeholder, which then grows fragment by fragment with a
    /// render after each one.
    pub async fn complete_turn(&mut self, reply: Reply, view: &mut impl ChatView) {
        match reply {
            Reply::Complete(text) => {
                self.conversation = self.conversation.with_message(ChatMessage::bot(text));
                self.stop_loading(view);
                view.render(&self.conversation);
            }
            Reply::Stream(mut fragments) => {
                self.conversation = self.conversation.with_message(ChatMessage::bot(""));
                let index = self.conversation.len() - 1;
                self.stop_loading(view);
                view.render(&self.conversation);

                while let Some(fragment) = fragments.next().await {
                    match self.conversation.append_fragment(index, &fragment) {
                        Ok(updated) => {
                            self.conversation = updated;
                            view.render(&self.conversation);
                        }
                        Err(e) => {
                            warn!(error = %e, "dropping fragment");
                            break;
                        }
                    }
                }
            }
        }

        self.in_flight = false;
        view.set_input_enabled(true);
        view.focus_input();
    }

    /// Submit `input` through `transport` and present the reply.
    pub async fn submit(
        &mut self,
        input: &str,
        transport: &TransportAction,
        view: &mut impl ChatView,
    ) -> Result<(), TurnRejected> {
        let turn = self.begin_turn(input, view)?;
        let reply = transport
            .handle(&self.session_id, &turn.message, &turn.history)
            .await;
        self.complete_turn(reply, view).await;
        Ok(())
    }

    fn stop_loading(&mut self, view: &mut impl ChatView) {
        self.loading = false;
        view.set_loading(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::box_provider::BoxLlmProvider;
    use crate::llm::testing::ScriptedProvider;
    use crate::pipeline::prompt::PromptBuilder;
    use crate::transport::TurnEngine;
    use chatflow_types::chat::ChatRole;
    use chatflow_types::config::FALLBACK_MESSAGE;
    use chatflow_types::generation::GenerationConfig;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    enum ViewEvent {
        Loading(bool),
        InputEnabled(bool),
        Render(Vec<ChatMessage>),
        Focus,
    }

    #[derive(Default)]
    struct RecordingView {
        events: Vec<ViewEvent>,
    }

    impl RecordingView {
        fn renders(&self) -> Vec<&Vec<ChatMessage>> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    ViewEvent::Render(messages) => Some(messages),
                    _ => None,
                })
                .collect()
        }
    }

    impl ChatView for RecordingView {
        fn set_loading(&mut self, loading: bool) {
            self.events.push(ViewEvent::Loading(loading));
        }

        fn set_input_enabled(&mut self, enabled: bool) {
            self.events.push(ViewEvent::InputEnabled(enabled));
        }

        fn render(&mut self, conversation: &Conversation) {
            self.events
                .push(ViewEvent::Render(conversation.messages().to_vec()));
        }

        fn focus_input(&mut self) {
            self.events.push(ViewEvent::Focus);
        }
    }

    fn transport(provider: ScriptedProvider, streaming: bool) -> TransportAction {
        let engine = TurnEngine::generative(
            Arc::new(BoxLlmProvider::new(provider)),
            GenerationConfig::default(),
            streaming,
        )
        .unwrap();
        TransportAction::new(engine, FALLBACK_MESSAGE)
    }

    fn presenter() -> PresentationLoop {
        PresentationLoop::new(SessionId("s-1".to_string()), "Welcome!")
    }

    #[tokio::test]
    async fn test_buffered_hello_scenario() {
        let provider = ScriptedProvider::replying("Hi there!");
        let requests = provider.requests();
        let transport = transport(provider, false);
        let mut presenter = presenter();
        let mut view = RecordingView::default();

        presenter.submit("hello", &transport, &mut view).await.unwrap();

        assert_eq!(
            presenter.conversation().messages(),
            &[
                ChatMessage::bot("Welcome!"),
                ChatMessage::user("hello"),
                ChatMessage::bot("Hi there!"),
            ]
        );
        assert!(!presenter.is_loading());
        assert!(!presenter.is_in_flight());

        let prompt = &requests.lock().unwrap()[0].messages[0].content;
        assert_eq!(
            prompt,
            &PromptBuilder::compose("hello", &[ChatMessage::bot("Welcome!")])
        );
    }

    #[tokio::test]
    async fn test_streaming_fragments_scenario() {
        let transport = transport(ScriptedProvider::streaming(&["Hel", "lo", "!"]), true);
        let mut presenter = presenter();
        let mut view = RecordingView::default();

        presenter.submit("hello", &transport, &mut view).await.unwrap();

        let renders = view.renders();
        // user message, placeholder, three fragment updates
        assert_eq!(renders.len(), 5);
        let bot_contents: Vec<&str> = renders[1..]
            .iter()
            .map(|messages| messages.last().unwrap().content.as_str())
            .collect();
        assert_eq!(bot_contents, vec!["", "Hel", "Hello", "Hello!"]);
        for window in bot_contents.windows(2) {
            assert!(window[1].starts_with(window[0]));
        }

        let last = presenter.conversation().last().unwrap();
        assert_eq!(last.role, ChatRole::Bot);
        assert_eq!(last.content, "Hello!");
        assert_eq!(presenter.conversation().len(), 3);
    }

    #[tokio::test]
    async fn test_streaming_loading_clears_at_placeholder() {
        let transport = transport(ScriptedProvider::streaming(&["a", "b"]), true);
        let mut presenter = presenter();
        let mut view = RecordingView::default();

        presenter.submit("hello", &transport, &mut view).await.unwrap();

        let placeholder_render = view
            .events
            .iter()
            .position(|e| matches!(e, ViewEvent::Render(m) if m.last().is_some_and(|b| b.role == ChatRole::Bot && b.content.is_empty())))
            .unwrap();
        let loading_off = view
            .events
            .iter()
            .position(|e| *e == ViewEvent::Loading(false))
            .unwrap();
        assert!(loading_off < placeholder_render);

        let tail = &view.events[view.events.len() - 2..];
        assert_eq!(tail, &[ViewEvent::InputEnabled(true), ViewEvent::Focus]);
    }

    #[tokio::test]
    async fn test_streaming_backend_failure_shows_apology() {
        let transport = transport(ScriptedProvider::failing("boom"), true);
        let mut presenter = presenter();
        let mut view = RecordingView::default();

        presenter.submit("hello", &transport, &mut view).await.unwrap();
        assert_eq!(
            presenter.conversation().last().unwrap().content,
            FALLBACK_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_partial_stream_keeps_delivered_text() {
        let transport = transport(ScriptedProvider::failing_after(&["Hel", "lo"]), true);
        let mut presenter = presenter();
        let mut view = RecordingView::default();

        presenter.submit("hello", &transport, &mut view).await.unwrap();
        assert_eq!(presenter.conversation().last().unwrap().content, "Hello");
        assert!(!presenter.is_in_flight());
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let mut presenter = presenter();
        let mut view = RecordingView::default();
        let err = presenter.begin_turn("   ", &mut view).unwrap_err();
        assert_eq!(err, TurnRejected::Invalid(InvalidMessage::Empty));
        assert!(view.events.is_empty());
        assert_eq!(presenter.conversation().len(), 1);
    }

    #[test]
    fn test_submission_rejected_while_in_flight() {
        let mut presenter = presenter();
        let mut view = RecordingView::default();
        presenter.begin_turn("first", &mut view).unwrap();
        let err = presenter.begin_turn("second", &mut view).unwrap_err();
        assert_eq!(err, TurnRejected::InFlight);
        assert_eq!(presenter.conversation().len(), 2);
    }

    #[test]
    fn test_history_excludes_new_message() {
        let mut presenter = presenter();
        let mut view = RecordingView::default();
        let turn = presenter.begin_turn("hello", &mut view).unwrap();
        assert_eq!(turn.history, vec![ChatMessage::bot("Welcome!")]);
        assert_eq!(turn.message, "hello");
        assert!(presenter.is_loading());
        assert_eq!(view.events[0], ViewEvent::InputEnabled(false));
        assert_eq!(view.events[1], ViewEvent::Loading(true));
    }

    #[tokio::test]
    async fn test_reset_restores_greeting() {
        let transport = transport(ScriptedProvider::replying("Hi there!"), false);
        let mut presenter = presenter();
        let mut view = RecordingView::default();
        presenter.submit("hello", &transport, &mut view).await.unwrap();

        presenter.reset(&mut view);
        assert_eq!(
            presenter.conversation().messages(),
            &[ChatMessage::bot("Welcome!")]
        );
    }
}
