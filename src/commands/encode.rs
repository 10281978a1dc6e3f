//! Encode command - hide a message behind an emoji.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use emoji_cipher::{
    assess_password, encode_message, CipherAlgorithm, CompressionAlgorithm, EncodeOptions,
    PasswordStrength, StrengthTier, DEFAULT_ANCHORS,
};

use super::{read_input, CommandExecutor};

/// Hide a message behind an emoji.
///
/// The output looks like the bare emoji. Paste it anywhere that keeps
/// Unicode intact; the message survives copy and paste.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// Message to hide (reads --file or stdin if not provided)
    #[arg(short, long, conflicts_with = "file")]
    pub message: Option<String>,

    /// Read the message from a text file
    #[arg(short, long, conflicts_with = "message")]
    pub file: Option<PathBuf>,

    /// Visible character the message hides behind
    #[arg(short, long, default_value_t = DEFAULT_ANCHORS[0].to_string())]
    pub anchor: String,

    /// Store the message uncompressed
    #[arg(long)]
    pub no_compress: bool,

    /// Compression algorithm: rle, lzw or deflate
    #[arg(long, default_value = "rle", conflicts_with = "no_compress")]
    pub compression: CompressionAlgorithm,

    /// Password for encryption (message is stored in the clear without one)
    #[arg(short, long, env = "EMOJI_CIPHER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Key derivation strength: low, medium or high
    #[arg(short, long, default_value = "high")]
    pub strength: StrengthTier,

    /// Cipher: aes-gcm or chacha20-poly1305
    #[arg(long, default_value = "aes-gcm")]
    pub cipher: CipherAlgorithm,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl EncodeCommand {
    fn options(&self) -> EncodeOptions {
        let mut options = EncodeOptions::default()
            .with_compression(self.compression)
            .with_strength(self.strength)
            .with_cipher(self.cipher);

        if self.no_compress {
            options = options.without_compression();
        }

        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            let strength = assess_password(password);
            if strength <= PasswordStrength::Weak {
                warn!(%strength, "password is weak, consider a longer one with mixed characters");
            }
            options = options.with_password(password);
        }

        options
    }
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self) -> Result<()> {
        let message = read_input(self.message.as_deref(), self.file.as_deref(), "message")?;

        let encoded = encode_message(&message, &self.anchor, &self.options())
            .context("Failed to encode message")?;

        let header = &encoded.header;
        eprintln!(
            "Hidden {} bytes as {} selectors{}",
            header.original_size,
            encoded.hidden_len(),
            if header.is_encrypted() { " (encrypted)" } else { "" },
        );
        if let Some(savings) = encoded.savings_percent() {
            eprintln!("Compression: {} -> {} bytes ({:.1}% saved)", header.original_size, header.compressed_size, savings);
        }

        match &self.output {
            Some(path) => {
                fs::write(path, &encoded.text)
                    .with_context(|| format!("Failed to write output to {}", path.display()))?;
                eprintln!("Written to {}", path.display());
            }
            None => println!("{}", encoded.text),
        }

        Ok(())
    }
}
