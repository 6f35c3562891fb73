//! Prompt composition for the generative reply engine.
//!
//! The backend receives one plain-text prompt: a fixed persona preamble, the
//! role-labelled transcript of the conversation so far, the new user message,
//! and an open `Assistant:` turn for the model to complete.

use chatflow_types::chat::ChatMessage;

/// Persona preamble placed at the top of every prompt.
pub const PERSONA_PREAMBLE: &str = "You are ChatFlow, a friendly and helpful AI assistant. \
Your goal is to provide accurate and concise answers to the user's questions.";

/// Builds the prompt text for a single turn.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Compose the full prompt for `message` given the prior `history`.
    ///
    /// Pure and deterministic: identical inputs yield byte-identical output.
    pub fn compose(message: &str, history: &[ChatMessage]) -> String {
        let transcript = Self::transcript(history);
        format!(
            "{PERSONA_PREAMBLE}\n\nConversation History:\n{transcript}\n\nUser: {message}\n\nAssistant:"
        )
    }

    /// One `"{role}: {content}"` line per message, in order.
    pub fn transcript(history: &[ChatMessage]) -> String {
        history
            .iter()
            .map(|msg| format!("{}: {}", msg.role, msg.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
