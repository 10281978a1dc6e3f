//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.

mod decode;
mod encode;
mod inspect;
mod scan;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use inspect::InspectCommand;
pub use scan::ScanCommand;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self) -> Result<()>;
}

/// Resolves command input: inline text, then a file, then stdin.
///
/// Surrounding whitespace is trimmed so pasted text with a trailing newline
/// still starts at the anchor.
pub(crate) fn read_input(inline: Option<&str>, file: Option<&Path>, what: &str) -> Result<String> {
    let raw = match (inline, file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {} from {}", what, path.display()))?,
        (None, None) => {
            eprintln!("Reading {} from stdin (Ctrl+D to finish):", what);
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .with_context(|| format!("Failed to read {} from stdin", what))?;
            buffer
        }
    };
    Ok(raw.trim().to_string())
}
