//! Emoji Cipher - hide messages behind a single emoji
//!
//! A CLI for variation-selector steganography with optional compression
//! and password-based encryption.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use commands::{CommandExecutor, DecodeCommand, EncodeCommand, InspectCommand, ScanCommand};

/// Emoji Cipher - hide messages behind a single emoji
///
/// Messages are stored as invisible variation selectors after a visible
/// character, optionally compressed and encrypted with a password.
#[derive(Parser)]
#[command(name = "emoji-cipher")]
#[command(version)]
#[command(about = "Hide messages behind a single emoji")]
#[command(long_about = None)]
struct Cli {
    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a message behind an emoji
    Encode(EncodeCommand),

    /// Recover a message hidden behind an emoji
    Decode(DecodeCommand),

    /// Find every hidden message in a text
    Scan(ScanCommand),

    /// Show a message header without decoding it
    Inspect(InspectCommand),
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = build_env_filter(level);

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    Ok(())
}

/// Builds the log filter; `RUST_LOG`, when set, overrides `--verbose`.
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match &cli.command {
        Commands::Encode(cmd) => cmd.execute(),
        Commands::Decode(cmd) => cmd.execute(),
        Commands::Scan(cmd) => cmd.execute(),
        Commands::Inspect(cmd) => cmd.execute(),
    }
}
