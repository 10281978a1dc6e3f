//! Message encoding for Emoji Cipher.
//!
//! This module orchestrates the encoding process:
//! 1. Measure the plaintext and compute its CRC-32
//! 2. Compress (optional)
//! 3. Encrypt with the password (optional)
//! 4. Build the header and frame header + payload
//! 5. Hide the container behind the anchor as variation selectors

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::crypto::checksum::crc32;
use crate::crypto::{
    encrypt, CipherAlgorithm, CompressionAlgorithm, CompressionError, StrengthTier,
    SymmetricError,
};
use crate::frame::{frame, FrameError, Header, TEXT_ENCODING};
use crate::stego::{normalize_anchor, selector};
use crate::VERSION;

/// Errors that can occur during encoding.
#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("Invalid anchor {0:?}: must be exactly one visible character")]
    InvalidAnchor(String),

    #[error("Compression error: {0}")]
    CompressionError(#[from] CompressionError),

    #[error("Encryption error: {0}")]
    EncryptionError(#[from] SymmetricError),

    #[error("Framing error: {0}")]
    FrameError(#[from] FrameError),
}

/// Options for [`encode_message`].
///
/// The password is never serialized.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Apply the compression stage.
    pub compress: bool,
    /// Coder used when `compress` is set.
    pub compression: CompressionAlgorithm,
    /// Apply the encryption stage (only effective with a non-empty password).
    pub encrypt: bool,
    /// Password for the encryption stage.
    #[serde(skip)]
    pub password: Option<String>,
    /// Key-derivation cost.
    pub strength: StrengthTier,
    /// AEAD primitive.
    pub cipher: CipherAlgorithm,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compress: true,
            compression: CompressionAlgorithm::default(),
            encrypt: false,
            password: None,
            strength: StrengthTier::default(),
            cipher: CipherAlgorithm::default(),
        }
    }
}

impl fmt::Debug for EncodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodeOptions")
            .field("compress", &self.compress)
            .field("compression", &self.compression)
            .field("encrypt", &self.encrypt)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("strength", &self.strength)
            .field("cipher", &self.cipher)
            .finish()
    }
}

impl EncodeOptions {
    /// Enables encryption with `password`.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self.encrypt = true;
        self
    }

    /// Compresses with `algorithm`.
    pub fn with_compression(mut self, algorithm: CompressionAlgorithm) -> Self {
        self.compress = true;
        self.compression = algorithm;
        self
    }

    /// Stores the payload uncompressed.
    pub fn without_compression(mut self) -> Self {
        self.compress = false;
        self
    }

    /// Sets the key-derivation cost.
    pub fn with_strength(mut self, strength: StrengthTier) -> Self {
        self.strength = strength;
        self
    }

    /// Sets the AEAD primitive.
    pub fn with_cipher(mut self, cipher: CipherAlgorithm) -> Self {
        self.cipher = cipher;
        self
    }

    /// The password, if encryption will actually run.
    fn effective_password(&self) -> Option<&str> {
        if !self.encrypt {
            return None;
        }
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// Result of encoding a message.
#[derive(Debug, Clone)]
pub struct EncodedMessage {
    /// Anchor followed by the hidden selectors - this is what gets shared.
    pub text: String,
    /// Header embedded in the text.
    pub header: Header,
}

impl EncodedMessage {
    /// Number of bytes hidden behind the anchor.
    pub fn hidden_len(&self) -> usize {
        self.text.chars().count().saturating_sub(1)
    }

    /// Space saved by compression, in percent.
    pub fn savings_percent(&self) -> Option<f64> {
        savings_percent(self.header.original_size, self.header.compressed_size)
    }
}

/// `(original - compressed) / original * 100`, or `None` if either is zero.
pub(crate) fn savings_percent(original_size: usize, compressed_size: usize) -> Option<f64> {
    if original_size == 0 || compressed_size == 0 {
        return None;
    }
    Some((original_size as f64 - compressed_size as f64) / original_size as f64 * 100.0)
}

/// Encodes `plaintext` behind `anchor`.
///
/// # Arguments
/// * `plaintext` - The message to hide
/// * `anchor` - One visible character (variation selectors are stripped)
/// * `options` - Compression and encryption settings
///
/// # Returns
/// The emitted text together with the header it carries.
pub fn encode_message(
    plaintext: &str,
    anchor: &str,
    options: &EncodeOptions,
) -> Result<EncodedMessage, EncoderError> {
    let anchor_char =
        normalize_anchor(anchor).ok_or_else(|| EncoderError::InvalidAnchor(anchor.to_string()))?;

    // Step 1: Measure
    let plain_bytes = plaintext.as_bytes();
    let original_size = plain_bytes.len();
    let checksum = crc32(plain_bytes);

    // Step 2: Compress
    let mut payload = if options.compress {
        options.compression.compress(plain_bytes)?
    } else {
        plain_bytes.to_vec()
    };

    debug!(
        original_size,
        stage_size = payload.len(),
        compress = options.compress,
        algorithm = %options.compression,
        "compression stage done"
    );

    // Step 3: Encrypt
    let (salt, iv, iterations) = match options.effective_password() {
        Some(password) => {
            let encrypted = encrypt(&payload, password, options.strength, options.cipher)?;
            debug!(
                iterations = encrypted.iterations,
                cipher = %encrypted.algorithm,
                "encryption stage done"
            );
            let params = (
                BASE64.encode(encrypted.salt),
                BASE64.encode(&encrypted.iv),
                encrypted.iterations,
            );
            payload = encrypted.ciphertext;
            params
        }
        None => (String::new(), String::new(), 0),
    };
    let is_encrypted = iterations > 0;

    // Step 4: Header
    let header = Header {
        version: VERSION,
        timestamp: now_millis(),
        compression: u8::from(options.compress),
        encryption: u8::from(is_encrypted),
        crc32: checksum,
        original_size,
        compressed_size: payload.len(),
        salt,
        iv,
        iterations,
        algorithm: options.cipher.tag().to_string(),
        encoding: TEXT_ENCODING.to_string(),
        compression_algorithm: (options.compress
            && options.compression != CompressionAlgorithm::Rle)
            .then_some(options.compression),
    };

    // Step 5: Frame and hide
    let container = frame(&header, &payload)?;
    let text = selector::encode(&anchor_char.to_string(), &container);

    debug!(
        container_len = container.len(),
        text_len = text.len(),
        "message encoded"
    );

    Ok(EncodedMessage { text, header })
}

/// Bytes the payload would occupy after compression with `algorithm`.
pub fn estimate_payload_size(
    plaintext: &str,
    algorithm: CompressionAlgorithm,
) -> Result<usize, CompressionError> {
    Ok(algorithm.compress(plaintext.as_bytes())?.len())
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::unframe;

    fn header_of(encoded: &EncodedMessage) -> Header {
        let container = selector::decode(&encoded.text);
        unframe(&container).unwrap().0
    }

    #[test]
    fn test_hello_example() {
        let encoded = encode_message("hello", "😀", &EncodeOptions::default()).unwrap();

        assert!(encoded.text.starts_with('😀'));
        let header = header_of(&encoded);
        assert_eq!(header, encoded.header);
        assert_eq!(header.compression, 1);
        assert_eq!(header.encryption, 0);
        assert_eq!(header.original_size, 5);
        assert_eq!(header.compressed_size, 5);
        assert_eq!(header.crc32, 0x3610_A686);
        assert_eq!(header.iterations, 0);
        assert!(header.salt.is_empty() && header.iv.is_empty());
        assert_eq!(header.compression_algorithm, None);
    }

    #[test]
    fn test_encrypted_header_fields() {
        let options = EncodeOptions::default()
            .with_password("hunter2")
            .with_strength(StrengthTier::Low);
        let encoded = encode_message("attack at dawn", "🔒", &options).unwrap();
        let header = header_of(&encoded);

        assert_eq!(header.encryption, 1);
        assert_eq!(header.iterations, 50_000);
        assert_eq!(header.salt_bytes().unwrap().len(), 32);
        assert_eq!(header.iv_bytes().unwrap().len(), 16);
        // Ciphertext carries a 16-byte tag.
        assert_eq!(header.compressed_size, "attack at dawn".len() + 16);
    }

    #[test]
    fn test_empty_password_disables_encryption() {
        let options = EncodeOptions::default().with_password("");
        let encoded = encode_message("hi", "🔥", &options).unwrap();

        assert_eq!(encoded.header.encryption, 0);
        assert_eq!(encoded.header.iterations, 0);
    }

    #[test]
    fn test_password_without_flag_is_ignored() {
        let mut options = EncodeOptions::default();
        options.password = Some("secret".to_string());
        let encoded = encode_message("hi", "🔥", &options).unwrap();

        assert_eq!(encoded.header.encryption, 0);
    }

    #[test]
    fn test_compressed_size_matches_payload() {
        let plaintext = format!("{}{}", "a".repeat(100), "b".repeat(3));
        let encoded = encode_message(&plaintext, "✨", &EncodeOptions::default()).unwrap();

        // 100 'a' -> one token, "bbb" -> raw
        assert_eq!(encoded.header.compressed_size, 3 + 3);
        assert_eq!(encoded.header.original_size, 103);

        let container = selector::decode(&encoded.text);
        let (_, payload) = unframe(&container).unwrap();
        assert_eq!(payload.len(), encoded.header.compressed_size);
    }

    #[test]
    fn test_non_default_compression_is_tagged() {
        let options = EncodeOptions::default().with_compression(CompressionAlgorithm::Deflate);
        let encoded = encode_message("tagged", "🌈", &options).unwrap();
        assert_eq!(
            encoded.header.compression_algorithm,
            Some(CompressionAlgorithm::Deflate)
        );

        let options = options.without_compression();
        let encoded = encode_message("untagged", "🌈", &options).unwrap();
        assert_eq!(encoded.header.compression, 0);
        assert_eq!(encoded.header.compression_algorithm, None);
    }

    #[test]
    fn test_anchor_normalization() {
        let encoded = encode_message("x", "❤\u{FE0F}", &EncodeOptions::default()).unwrap();
        assert!(encoded.text.starts_with('❤'));
        assert_eq!(selector::decode(&encoded.text)[..2], [0xD8, 0x9C]);
    }

    #[test]
    fn test_invalid_anchor() {
        for anchor in ["", "ab", "\u{FE0F}"] {
            let result = encode_message("x", anchor, &EncodeOptions::default());
            assert!(matches!(result, Err(EncoderError::InvalidAnchor(_))), "{:?}", anchor);
        }
    }

    #[test]
    fn test_hidden_len_and_savings() {
        let plaintext = "z".repeat(200);
        let encoded = encode_message(&plaintext, "🚀", &EncodeOptions::default()).unwrap();

        assert_eq!(encoded.hidden_len(), selector::decode(&encoded.text).len());
        let savings = encoded.savings_percent().unwrap();
        assert!(savings > 90.0);
    }

    #[test]
    fn test_debug_redacts_password() {
        let options = EncodeOptions::default().with_password("topsecret");
        let debug = format!("{:?}", options);
        assert!(!debug.contains("topsecret"));
    }

    #[test]
    fn test_options_serialization_skips_password() {
        let options = EncodeOptions::default().with_password("topsecret");
        let json = serde_json::to_string(&options).unwrap();
        assert!(!json.contains("topsecret"));

        let restored: EncodeOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.password, None);
        assert!(restored.encrypt);
    }

    #[test]
    fn test_estimate_payload_size() {
        assert_eq!(estimate_payload_size("hello", CompressionAlgorithm::Rle).unwrap(), 5);
        assert_eq!(
            estimate_payload_size(&"q".repeat(50), CompressionAlgorithm::Rle).unwrap(),
            3
        );
    }
}
