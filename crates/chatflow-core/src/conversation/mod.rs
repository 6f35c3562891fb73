//! Client-side conversation state and the presentation loop that drives it.

pub mod presenter;

use serde::Serialize;

use chatflow_types::chat::{ChatMessage, ChatRole};

/// Errors from conversation updates.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("message index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("message at index {0} is not a bot message")]
    NotBotMessage(usize),
}

/// Ordered, append-only list of chat messages.
///
/// Updates return a new `Conversation`; the previous value is left intact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A conversation opened by a bot greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::bot(greeting)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// A new conversation with `message` appended.
    pub fn with_message(&self, message: ChatMessage) -> Self {
        let mut messages = self.messages.clone();
        messages.push(message);
        Self { messages }
    }

    /// A new conversation where the bot message at `index` has `fragment`
    /// appended to its content. Every other message is unchanged.
    pub fn append_fragment(&self, index: usize, fragment: &str) -> Result<Self, ConversationError> {
        let target = self
            .messages
            .get(index)
            .ok_or(ConversationError::IndexOutOfRange {
                index,
                len: self.messages.len(),
            })?;
        if target.role != ChatRole::Bot {
            return Err(ConversationError::NotBotMessage(index));
        }

        let mut messages = self.messages.clone();
        messages[index].content.push_str(fragment);
        Ok(Self { messages })
    }
}
