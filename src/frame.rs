//! Self-describing message container.
//!
//! Layout (before the bytes are hidden behind the anchor):
//!
//! ```text
//! MARKER (U+061C) | HEADER (compact JSON, UTF-8) | SEPARATOR (U+034F) | PAYLOAD
//! ```
//!
//! The header carries everything needed to undo the compression and
//! encryption stages. Both delimiters are format-control characters that never
//! occur in the header JSON, whose strings are base64, digits or fixed ASCII
//! tags.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{CipherAlgorithm, CompressionAlgorithm, SymmetricError};

/// Start-of-container marker (ARABIC LETTER MARK).
pub const MARKER: char = '\u{061C}';

/// Header/payload separator (COMBINING GRAPHEME JOINER).
pub const SEPARATOR: char = '\u{034F}';

/// UTF-8 encoding of [`MARKER`].
pub const MARKER_BYTES: &[u8] = "\u{061C}".as_bytes();

/// UTF-8 encoding of [`SEPARATOR`].
pub const SEPARATOR_BYTES: &[u8] = "\u{034F}".as_bytes();

/// Text encoding tag stored in every header.
pub const TEXT_ENCODING: &str = "UTF-8";

/// Errors raised while building or parsing a container.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Header marker not found")]
    MarkerNotFound,

    #[error("Header separator not found")]
    SeparatorNotFound,

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Header serialization failed: {0}")]
    SerializationFailed(String),
}

/// Message metadata stored in front of the payload.
///
/// Serialized with camelCase keys in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Format revision.
    pub version: u32,
    /// Creation time, milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
    /// 1 if the payload is compressed.
    pub compression: u8,
    /// 1 if the payload is encrypted.
    pub encryption: u8,
    /// CRC-32 of the plaintext bytes.
    #[serde(default)]
    pub crc32: u32,
    /// Plaintext length in bytes.
    pub original_size: usize,
    /// Stored payload length in bytes.
    pub compressed_size: usize,
    /// Base64 key-derivation salt, empty when not encrypted.
    #[serde(default)]
    pub salt: String,
    /// Base64 AEAD IV, empty when not encrypted.
    #[serde(default)]
    pub iv: String,
    /// PBKDF2 iteration count, 0 when not encrypted.
    #[serde(default)]
    pub iterations: u32,
    /// AEAD tag.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Text encoding of the plaintext.
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Compression coder; absent means the run transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_algorithm: Option<CompressionAlgorithm>,
}

fn default_algorithm() -> String {
    CipherAlgorithm::default().tag().to_string()
}

fn default_encoding() -> String {
    TEXT_ENCODING.to_string()
}

impl Header {
    /// Whether the compression stage was applied.
    pub fn is_compressed(&self) -> bool {
        self.compression != 0
    }

    /// Whether the encryption stage was applied.
    pub fn is_encrypted(&self) -> bool {
        self.encryption != 0
    }

    /// Coder used for the compression stage.
    pub fn compression_algorithm(&self) -> CompressionAlgorithm {
        self.compression_algorithm.unwrap_or_default()
    }

    /// AEAD named by the `algorithm` tag.
    pub fn cipher(&self) -> Result<CipherAlgorithm, SymmetricError> {
        CipherAlgorithm::from_tag(&self.algorithm)
    }

    /// Decoded key-derivation salt.
    pub fn salt_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(&self.salt)
    }

    /// Decoded AEAD IV.
    pub fn iv_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(&self.iv)
    }

    /// Serializes the header to compact JSON.
    pub fn to_json(&self) -> Result<String, FrameError> {
        serde_json::to_string(self).map_err(|e| FrameError::SerializationFailed(e.to_string()))
    }
}

/// Builds `MARKER ‖ header JSON ‖ SEPARATOR ‖ payload`.
pub fn frame(header: &Header, payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let header_bytes =
        serde_json::to_vec(header).map_err(|e| FrameError::SerializationFailed(e.to_string()))?;

    let mut container = Vec::with_capacity(
        MARKER_BYTES.len() + header_bytes.len() + SEPARATOR_BYTES.len() + payload.len(),
    );
    container.extend_from_slice(MARKER_BYTES);
    container.extend_from_slice(&header_bytes);
    container.extend_from_slice(SEPARATOR_BYTES);
    container.extend_from_slice(payload);

    Ok(container)
}

/// Splits a container into its header and the still-encoded payload.
///
/// The first marker anywhere in the data starts the header; the first
/// separator after it ends the header.
pub fn unframe(container: &[u8]) -> Result<(Header, &[u8]), FrameError> {
    let header_start = find(container, MARKER_BYTES).ok_or(FrameError::MarkerNotFound)?
        + MARKER_BYTES.len();

    let header_len =
        find(&container[header_start..], SEPARATOR_BYTES).ok_or(FrameError::SeparatorNotFound)?;
    let header_end = header_start + header_len;

    let header: Header = serde_json::from_slice(&container[header_start..header_end])
        .map_err(|e| FrameError::MalformedHeader(e.to_string()))?;

    Ok((header, &container[header_end + SEPARATOR_BYTES.len()..]))
}

/// Position of the first occurrence of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
