//! Welcome banner display for chat sessions.

use console::style;

use chatflow_types::generation::DeploymentMode;

/// Print the banner shown before the greeting.
pub fn print_welcome_banner(mode: DeploymentMode, model: &str, session_id: &str) {
    println!();
    println!("  {}", style("ChatFlow").cyan().bold());
    println!();
    println!("  {}     {}", style("Mode:").bold(), style(mode).dim());
    println!("  {}    {}", style("Model:").bold(), style(model).dim());
    println!(
        "  {}  {}",
        style("Session:").bold(),
        style(&session_id[..8.min(session_id.len())]).dim()
    );
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
}
