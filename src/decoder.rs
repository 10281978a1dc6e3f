//! Message decoding for Emoji Cipher.
//!
//! This module orchestrates the decoding process:
//! 1. Read the variation selectors behind the first anchor
//! 2. Split marker / header / separator / payload
//! 3. Decrypt with the password if the header says so
//! 4. Decompress if the header says so
//! 5. Validate UTF-8 and the CRC-32
//!
//! Every failure carries an [`ErrorKind`], so callers can tell a wrong
//! password apart from text that was never encoded.

use std::fmt;
use std::string::FromUtf8Error;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::crypto::checksum::crc32;
use crate::crypto::symmetric::DEFAULT_ITERATIONS;
use crate::crypto::{decrypt, CompressionError, SymmetricError, MAX_DECOMPRESSED_SIZE};
use crate::encoder::savings_percent;
use crate::frame::{unframe, FrameError, Header};
use crate::stego::selector;

/// Broad failure category, for choosing what to tell the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The text never was a valid container.
    Structural,
    /// The message is encrypted and no password was given.
    PasswordRequired,
    /// Wrong password or tampered ciphertext.
    Authentication,
    /// The payload does not decompress.
    Compression,
    /// The plaintext is not valid UTF-8.
    Encoding,
    /// The plaintext does not match the stored checksum.
    Integrity,
}

/// Errors that can occur during decoding.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("No hidden data found")]
    NoHiddenData,

    #[error("Header marker not found, this is not encoded data")]
    MarkerNotFound,

    #[error("Header separator not found, the data is truncated or corrupted")]
    SeparatorNotFound,

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Unsupported encryption algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid encryption parameter: {0}")]
    InvalidParameter(String),

    #[error("The message is password protected, a password is required")]
    PasswordRequired,

    #[error("Decryption failed, the password is probably wrong")]
    DecryptionFailed,

    #[error("Decompression failed: {0}")]
    Decompression(#[from] CompressionError),

    #[error("Decoded data is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("Checksum mismatch: header {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
}

impl DecodeError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoHiddenData
            | Self::MarkerNotFound
            | Self::SeparatorNotFound
            | Self::MalformedHeader(_)
            | Self::UnsupportedAlgorithm(_)
            | Self::InvalidParameter(_) => ErrorKind::Structural,
            Self::PasswordRequired => ErrorKind::PasswordRequired,
            Self::DecryptionFailed => ErrorKind::Authentication,
            Self::Decompression(_) => ErrorKind::Compression,
            Self::InvalidUtf8(_) => ErrorKind::Encoding,
            Self::ChecksumMismatch { .. } => ErrorKind::Integrity,
        }
    }

    /// True if retrying with different input (a password) can succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::PasswordRequired
    }
}

impl From<FrameError> for DecodeError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::MarkerNotFound => Self::MarkerNotFound,
            FrameError::SeparatorNotFound => Self::SeparatorNotFound,
            FrameError::MalformedHeader(msg) | FrameError::SerializationFailed(msg) => {
                Self::MalformedHeader(msg)
            }
        }
    }
}

impl From<SymmetricError> for DecodeError {
    fn from(err: SymmetricError) -> Self {
        match err {
            SymmetricError::DecryptionFailed => Self::DecryptionFailed,
            SymmetricError::UnknownAlgorithm(tag) => Self::UnsupportedAlgorithm(tag),
            other => Self::InvalidParameter(other.to_string()),
        }
    }
}

/// Options for [`decode_message`].
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Password for encrypted messages.
    #[serde(skip)]
    pub password: Option<String>,
    /// Treat a CRC-32 mismatch as an error instead of a warning.
    pub verify_checksum: bool,
}

impl fmt::Debug for DecodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("verify_checksum", &self.verify_checksum)
            .finish()
    }
}

impl DecodeOptions {
    /// Supplies the password for encrypted messages.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Fails on checksum mismatch.
    pub fn verify_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }

    fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// Result of decoding a message.
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    /// The recovered message.
    pub plaintext: String,
    /// Plaintext size recorded in the header.
    pub original_size: usize,
    /// Payload size recorded in the header.
    pub compressed_size: usize,
    /// Whether the plaintext matches the header's CRC-32.
    pub checksum_ok: bool,
    /// The full header.
    pub header: Header,
}

impl DecodedMessage {
    /// Space saved by compression, in percent.
    pub fn savings_percent(&self) -> Option<f64> {
        savings_percent(self.original_size, self.compressed_size)
    }
}

/// Reads the header of an encoded message without decrypting anything.
pub fn inspect(text: &str) -> Result<Header, DecodeError> {
    let container = selector::decode(text);
    if container.is_empty() {
        return Err(DecodeError::NoHiddenData);
    }
    let (header, _) = unframe(&container)?;
    Ok(header)
}

/// Decodes the message hidden behind the first anchor in `text`.
///
/// # Errors
/// Returns [`DecodeError::PasswordRequired`] for encrypted messages when no
/// password is set; the caller may retry with one. Every other error is
/// final for this text.
pub fn decode_message(text: &str, options: &DecodeOptions) -> Result<DecodedMessage, DecodeError> {
    // Step 1: Selectors -> container
    let container = selector::decode(text);
    if container.is_empty() {
        return Err(DecodeError::NoHiddenData);
    }

    // Step 2: Container -> header + payload
    let (header, payload) = unframe(&container)?;
    debug!(
        version = header.version,
        compression = header.compression,
        encryption = header.encryption,
        payload_len = payload.len(),
        "container parsed"
    );

    // Step 3: Decrypt
    let decrypted;
    let stage: &[u8] = if header.is_encrypted() {
        let password = options.password().ok_or(DecodeError::PasswordRequired)?;
        decrypted = decrypt_payload(&header, payload, password)?;
        &decrypted
    } else {
        payload
    };

    // Step 4: Decompress, never past the size the header declares
    let bytes = if header.is_compressed() {
        let limit = header.original_size.min(MAX_DECOMPRESSED_SIZE);
        header.compression_algorithm().decompress_limited(stage, limit)?
    } else {
        stage.to_vec()
    };

    // Step 5: Validate
    let plaintext = String::from_utf8(bytes)?;

    let actual = crc32(plaintext.as_bytes());
    let checksum_ok = actual == header.crc32;
    if !checksum_ok {
        if options.verify_checksum {
            return Err(DecodeError::ChecksumMismatch {
                expected: header.crc32,
                actual,
            });
        }
        warn!(
            expected = header.crc32,
            actual, "decoded message does not match its checksum"
        );
    }

    Ok(DecodedMessage {
        plaintext,
        original_size: header.original_size,
        compressed_size: header.compressed_size,
        checksum_ok,
        header,
    })
}

fn decrypt_payload(header: &Header, payload: &[u8], password: &str) -> Result<Vec<u8>, DecodeError> {
    let cipher = header.cipher()?;
    let salt = header
        .salt_bytes()
        .map_err(|e| DecodeError::InvalidParameter(format!("salt: {}", e)))?;
    let iv = header
        .iv_bytes()
        .map_err(|e| DecodeError::InvalidParameter(format!("iv: {}", e)))?;
    let iterations = if header.iterations == 0 {
        DEFAULT_ITERATIONS
    } else {
        header.iterations
    };

    let plaintext = decrypt(payload, &salt, &iv, password, iterations, cipher)?;
    debug!(iterations, %cipher, "payload decrypted");
    Ok(plaintext)
}
