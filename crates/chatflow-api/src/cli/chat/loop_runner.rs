//! Main chat loop orchestration.
//!
//! Resolves the session id, prints the banner and greeting, then feeds every
//! line the user types through the presentation loop until they leave.

use console::style;
use tracing::warn;

use chatflow_core::conversation::Conversation;
use chatflow_core::conversation::presenter::{PresentationLoop, TurnRejected};
use chatflow_core::session::get_or_create_session_id;
use chatflow_infra::client_store::FileClientStore;
use chatflow_types::chat::ChatRole;

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;
use super::view::TerminalView;

/// Run the interactive chat loop.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let store = FileClientStore::in_data_dir(&state.data_dir);
    let session_id = get_or_create_session_id(&store).await?;

    print_welcome_banner(
        state.transport.mode(),
        state.config.provider.resolved_model().unwrap_or("unset"),
        session_id.as_str(),
    );

    let mut view = TerminalView::new(ChatRenderer::new());
    let mut presenter = PresentationLoop::new(session_id, state.config.greeting.clone());
    presenter.reset(&mut view);

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let line = match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Line(line) => line,
        };

        if line.trim().is_empty() {
            continue;
        }

        if let Some(cmd) = commands::parse(&line) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Clear => chat_input.clear(),
                ChatCommand::Exit => break,
                ChatCommand::New => presenter.reset(&mut view),
                ChatCommand::History => print_history(presenter.conversation()),
                ChatCommand::Unknown(name) => println!(
                    "\n  {} Unknown command: {}. Type /help for available commands.\n",
                    style("?").yellow().bold(),
                    style(name).dim()
                ),
            }
            continue;
        }

        match presenter.submit(&line, &state.transport, &mut view).await {
            Ok(()) => {}
            Err(TurnRejected::Invalid(e)) => {
                println!("\n  {} {e}\n", style("!").yellow().bold());
            }
            Err(TurnRejected::InFlight) => {
                warn!("turn submitted while another was in flight");
            }
        }
    }

    println!("\n  {}", style("Session ended.").dim());
    Ok(())
}

fn print_history(conversation: &Conversation) {
    println!();
    for message in conversation.messages() {
        let label = match message.role {
            ChatRole::User => style("You").green().bold(),
            ChatRole::Bot => style("ChatFlow").cyan().bold(),
        };
        let preview: String = message.content.chars().take(100).collect();
        let ellipsis = if message.content.chars().count() > 100 { "..." } else { "" };
        println!("  {label} {preview}{ellipsis}");
    }
    println!();
}
