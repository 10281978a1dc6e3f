//! Scan command - find every hidden message in a text.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use emoji_cipher::{scan_messages, DecodeOptions, ScanError, DEFAULT_ANCHORS};

use super::{read_input, CommandExecutor};

/// Find and decode every hidden message in a text.
///
/// Every occurrence of a known anchor is tried. Plain emoji and damaged
/// messages are skipped; an encrypted message without a password stops
/// the scan.
#[derive(Args, Debug)]
pub struct ScanCommand {
    /// Text to scan (reads --file or stdin if not provided)
    #[arg(short, long, conflicts_with = "file")]
    pub input: Option<String>,

    /// Read the text from a file
    #[arg(short, long, conflicts_with = "input")]
    pub file: Option<PathBuf>,

    /// Anchors to look for (defaults to the built-in emoji set)
    #[arg(short, long, num_args = 1..)]
    pub anchors: Vec<String>,

    /// Password for encrypted messages
    #[arg(short, long, env = "EMOJI_CIPHER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Skip messages whose checksum does not match
    #[arg(long)]
    pub verify_checksum: bool,
}

impl ScanCommand {
    fn anchors(&self) -> Vec<String> {
        if self.anchors.is_empty() {
            DEFAULT_ANCHORS.iter().map(|c| c.to_string()).collect()
        } else {
            self.anchors.clone()
        }
    }
}

impl CommandExecutor for ScanCommand {
    fn execute(&self) -> Result<()> {
        let text = read_input(self.input.as_deref(), self.file.as_deref(), "text")?;

        let mut options = DecodeOptions::default().verify_checksum(self.verify_checksum);
        if let Some(password) = &self.password {
            options = options.with_password(password.clone());
        }

        let result = match scan_messages(&text, &self.anchors(), &options) {
            Ok(result) => result,
            Err(ScanError::PasswordRequired { offset }) => anyhow::bail!(
                "Message at byte {} is encrypted, pass --password or set EMOJI_CIPHER_PASSWORD",
                offset
            ),
        };

        if result.is_empty() {
            eprintln!("No hidden messages found");
            return Ok(());
        }

        eprintln!(
            "Found {} message(s), {} bytes total ({} bytes hidden)",
            result.len(),
            result.total_original_size(),
            result.total_compressed_size()
        );
        for (index, message) in result.messages.iter().enumerate() {
            println!("[{}] {} @{}: {}", index + 1, message.anchor, message.offset, message.plaintext);
        }

        Ok(())
    }
}
