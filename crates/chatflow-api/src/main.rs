//! ChatFlow CLI and HTTP server entry point.
//!
//! Binary name: `chatflow`
//!
//! Parses CLI arguments, sets up tracing, builds the reply engine for the
//! configured deployment mode, then dispatches to the chosen command.

mod cli;
mod http;
mod state;
#[cfg(test)]
mod testing;

use clap::Parser;
use clap_complete::generate;

use chatflow_infra::config::resolve_data_dir;
use chatflow_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,chatflow_core=debug,chatflow_infra=debug,chatflow=debug",
        _ => "trace",
    };
    let options = TracingOptions::new(filter)
        .with_json(cli.log_json)
        .with_otel(cli.otel);
    init_tracing(&options).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Neither of these needs a backend.
    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(*shell, &mut cmd, "chatflow", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Session { new } => {
            return cli::session::show_session(&resolve_data_dir(), *new, cli.json).await;
        }
        _ => {}
    }

    let state = AppState::init(cli.config.as_deref(), cli.mode).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} ChatFlow ({} mode) listening on {}",
                    console::style("⚡").bold(),
                    state.transport.mode(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Chat => {
            cli::chat::loop_runner::run_chat_loop(&state).await?;
        }

        Commands::Ask { message } => {
            cli::ask::ask(&state, &message.join(" "), cli.json).await?;
        }

        Commands::Completions { .. } | Commands::Session { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
///
/// A signal handler that cannot be installed never fires; the other one
/// still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
