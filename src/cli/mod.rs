use crate::errors::AppResult;
use clap::{Parser, Subcommand};

pub mod commands;

/// KRC-20 commit/reveal inscriber
#[derive(Parser)]
#[command(name = "krc20-inscribe")]
#[command(about = "KRC-20 commit/reveal inscriber for Kaspa")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build and print the canonical payload for an operation
    Payload(commands::payload::PayloadCommand),
    /// Derive the envelope redeem script and P2SH address for an operation
    Envelope(commands::envelope::EnvelopeCommand),
    /// Print the effective configuration
    Config(commands::config::ConfigCommand),
}

pub async fn run() -> AppResult<()> {
    // Initialise tracing subscriber to capture info!() macros
    // Uses RUST_LOG environment variable (defaults to "info" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Payload(command) => command.run(),
        Commands::Envelope(command) => command.run(),
        Commands::Config(command) => command.run(),
    }
}
