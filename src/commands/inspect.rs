//! Inspect command - show a message header without decoding the payload.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use emoji_cipher::inspect;

use super::{read_input, CommandExecutor};

/// Show the header of a hidden message.
///
/// No password is needed: the header is stored in the clear.
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Encoded text (reads --file or stdin if not provided)
    #[arg(short, long, conflicts_with = "file")]
    pub input: Option<String>,

    /// Read the encoded text from a file
    #[arg(short, long, conflicts_with = "input")]
    pub file: Option<PathBuf>,
}

impl CommandExecutor for InspectCommand {
    fn execute(&self) -> Result<()> {
        let text = read_input(self.input.as_deref(), self.file.as_deref(), "encoded text")?;

        let header = inspect(&text).context("No readable message header")?;
        let json = serde_json::to_string_pretty(&header).context("Failed to format header")?;
        println!("{}", json);

        Ok(())
    }
}
