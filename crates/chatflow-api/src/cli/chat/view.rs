//! Terminal implementation of [`ChatView`].
//!
//! Each render receives the whole conversation. [`TranscriptCursor`] works
//! out what is new since the last render so the terminal only ever appends.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use chatflow_core::conversation::Conversation;
use chatflow_core::conversation::presenter::ChatView;
use chatflow_types::chat::{ChatMessage, ChatRole};

use super::renderer::ChatRenderer;

/// One terminal update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    /// The conversation was reset.
    Restart,
    /// A finished bot message.
    Reply(String),
    /// An empty bot message that will grow in place.
    OpenStream,
    /// Text appended to the open bot message.
    Fragment(String),
    CloseStream,
}

/// Tracks how much of the conversation has already been printed.
#[derive(Debug, Default)]
pub struct TranscriptCursor {
    seen: usize,
    /// Bytes printed of the last message while it is still growing.
    open: Option<usize>,
}

impl TranscriptCursor {
    pub fn advance(&mut self, messages: &[ChatMessage]) -> Vec<RenderOp> {
        let mut ops = Vec::new();

        if messages.len() < self.seen {
            ops.extend(self.close());
            self.seen = 0;
            ops.push(RenderOp::Restart);
        }

        if let Some(printed) = self.open {
            let growing = self.seen.checked_sub(1).and_then(|i| messages.get(i));
            if let Some(message) = growing {
                if let Some(suffix) = message.content.get(printed..).filter(|s| !s.is_empty()) {
                    ops.push(RenderOp::Fragment(suffix.to_string()));
                    self.open = Some(message.content.len());
                }
            }
        }

        for message in &messages[self.seen..] {
            ops.extend(self.close());
            // The input prompt already echoed what the user typed.
            if message.role == ChatRole::User {
                continue;
            }
            if message.content.is_empty() {
                ops.push(RenderOp::OpenStream);
                self.open = Some(0);
            } else {
                ops.push(RenderOp::Reply(message.content.clone()));
            }
        }

        self.seen = messages.len();
        ops
    }

    /// Close the growing message, if any.
    pub fn close(&mut self) -> Option<RenderOp> {
        self.open.take().map(|_| RenderOp::CloseStream)
    }
}

pub struct TerminalView {
    renderer: ChatRenderer,
    cursor: TranscriptCursor,
    spinner: Option<ProgressBar>,
}

impl TerminalView {
    pub fn new(renderer: ChatRenderer) -> Self {
        Self {
            renderer,
            cursor: TranscriptCursor::default(),
            spinner: None,
        }
    }

    fn apply(&self, op: RenderOp) {
        match op {
            RenderOp::Restart => {
                println!();
                println!("  {}", style("--- new conversation ---").dim());
            }
            RenderOp::Reply(text) => {
                println!();
                self.renderer.print_bot_label();
                println!("{}", self.renderer.render_markdown(&text).trim_end());
                println!();
            }
            RenderOp::OpenStream => {
                println!();
                self.renderer.print_bot_label();
                self.renderer.print_fragment("  ");
            }
            RenderOp::Fragment(text) => self.renderer.print_fragment(&text),
            RenderOp::CloseStream => {
                println!();
                println!();
            }
        }
    }
}

impl ChatView for TerminalView {
    fn set_loading(&mut self, loading: bool) {
        if !loading {
            if let Some(spinner) = self.spinner.take() {
                spinner.finish_and_clear();
            }
            return;
        }
        if self.spinner.is_some() {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
            spinner.set_style(spinner_style);
        }
        spinner.set_message("thinking...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    // Input is only read between turns, so there is nothing to lock.
    fn set_input_enabled(&mut self, _enabled: bool) {}

    fn render(&mut self, conversation: &Conversation) {
        for op in self.cursor.advance(conversation.messages()) {
            self.apply(op);
        }
    }

    fn focus_input(&mut self) {
        if let Some(op) = self.cursor.close() {
            self.apply(op);
        }
    }
}
