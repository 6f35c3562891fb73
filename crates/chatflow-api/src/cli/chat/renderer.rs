//! Terminal markdown rendering.
//!
//! Streamed fragments are printed raw as they arrive; complete replies are
//! rendered as markdown through `termimad`.

use std::io::Write;

use console::style;
use termimad::MadSkin;
use termimad::crossterm::style::Color;

pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(Color::Cyan);
        skin.headers[0].set_fg(Color::Cyan);
        skin.headers[1].set_fg(Color::Cyan);
        skin.inline_code.set_fg(Color::Yellow);
        Self { skin }
    }

    /// Render markdown to a string, indented to line up with the labels.
    pub fn render_markdown(&self, markdown: &str) -> String {
        let rendered = self.skin.term_text(markdown).to_string();
        rendered
            .lines()
            .map(|line| format!("  {line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn print_bot_label(&self) {
        println!("  {}", style("ChatFlow").cyan().bold());
    }

    /// Print a streamed fragment without formatting.
    pub fn print_fragment(&self, fragment: &str) {
        print!("{fragment}");
        let _ = std::io::stdout().flush();
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}
