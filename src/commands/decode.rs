//! Decode command - recover a message hidden behind an emoji.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use emoji_cipher::{decode_message, DecodeError, DecodeOptions};

use super::{read_input, CommandExecutor};

/// Recover a message hidden behind an emoji.
///
/// The text must start with the emoji carrying the message. Use `scan`
/// for text that contains messages somewhere in the middle.
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// Encoded text (reads --file or stdin if not provided)
    #[arg(short, long, conflicts_with = "file")]
    pub input: Option<String>,

    /// Read the encoded text from a file
    #[arg(short, long, conflicts_with = "input")]
    pub file: Option<PathBuf>,

    /// Password for encrypted messages
    #[arg(short, long, env = "EMOJI_CIPHER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Fail when the checksum does not match instead of warning
    #[arg(long)]
    pub verify_checksum: bool,

    /// Write the message to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self) -> Result<()> {
        let text = read_input(self.input.as_deref(), self.file.as_deref(), "encoded text")?;

        let mut options = DecodeOptions::default().verify_checksum(self.verify_checksum);
        if let Some(password) = &self.password {
            options = options.with_password(password.clone());
        }

        let decoded = match decode_message(&text, &options) {
            Ok(decoded) => decoded,
            Err(DecodeError::PasswordRequired) => {
                anyhow::bail!("Message is encrypted, pass --password or set EMOJI_CIPHER_PASSWORD")
            }
            Err(err) => return Err(err).context("Failed to decode message"),
        };

        eprintln!(
            "Recovered {} bytes{}",
            decoded.original_size,
            if decoded.header.is_encrypted() { " (decrypted)" } else { "" },
        );
        if let Some(savings) = decoded.savings_percent() {
            eprintln!(
                "Compression: {} -> {} bytes ({:.1}% saved)",
                decoded.original_size, decoded.compressed_size, savings
            );
        }
        if !decoded.checksum_ok {
            eprintln!("Warning: checksum mismatch, the message may be damaged");
        }

        match &self.output {
            Some(path) => {
                fs::write(path, &decoded.plaintext)
                    .with_context(|| format!("Failed to write message to {}", path.display()))?;
                eprintln!("Written to {}", path.display());
            }
            None => println!("{}", decoded.plaintext),
        }

        Ok(())
    }
}
