//! CLI command definitions for the `chatflow` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod ask;
pub mod chat;
pub mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use chatflow_types::generation::DeploymentMode;

/// Chat with a generative backend from the terminal or over HTTP.
#[derive(Parser)]
#[command(name = "chatflow", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config.toml (defaults to the data directory).
    #[arg(long, global = true, env = "CHATFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the configured deployment mode (buffered, streaming, intent).
    #[arg(long, global = true)]
    pub mode: Option<DeploymentMode>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans through the OpenTelemetry stdout exporter.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on.
        #[arg(long, short, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Start an interactive chat session.
    Chat,

    /// Send a single message and print the reply.
    Ask {
        /// The message to send.
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Print the persisted session id, creating it on first use.
    Session {
        /// Replace the stored id with a fresh one.
        #[arg(long)]
        new: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
