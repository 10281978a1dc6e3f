//! # Emoji Cipher - hide messages behind a single emoji
//!
//! Emoji Cipher hides a message in the invisible tail of one visible
//! character. Each hidden byte becomes a Unicode variation selector, which
//! renderers fold into the preceding glyph, so `😎` and `😎` + 300 selectors
//! look the same on screen.
//!
//! ## Overview
//!
//! The hidden bytes form a self-describing container:
//! - **Marker** (U+061C) marks the start of the container
//! - **Header** is compact JSON with sizes, CRC-32 and crypto parameters
//! - **Separator** (U+034F) ends the header
//! - **Payload** is the message, optionally compressed and encrypted
//!
//! ## Pipeline
//!
//! - **Compression**: byte-run escape coding by default, LZW or DEFLATE on request
//! - **Encryption**: PBKDF2-HMAC-SHA256 (50k/100k/200k rounds) + AES-256-GCM
//!   or ChaCha20-Poly1305, salt and IV stored in the header
//! - **Scanning**: several messages pasted into one text are found and
//!   decoded independently
//!
//! ## Example Usage
//!
//! ```rust
//! use emoji_cipher::{decode_message, encode_message, DecodeOptions, EncodeOptions, StrengthTier};
//!
//! let options = EncodeOptions::default()
//!     .with_password("correct horse")
//!     .with_strength(StrengthTier::Low);
//! let encoded = encode_message("meet at noon", "😎", &options).unwrap();
//!
//! // Looks like a lone emoji
//! assert!(encoded.text.starts_with('😎'));
//!
//! let decoded = decode_message(
//!     &encoded.text,
//!     &DecodeOptions::default().with_password("correct horse"),
//! )
//! .unwrap();
//! assert_eq!(decoded.plaintext, "meet at noon");
//! ```
//!
//! ## Modules
//!
//! - [`stego`]: byte <-> variation selector codec and anchors
//! - [`crypto`]: compression, encryption, checksum, password strength
//! - [`frame`]: container header and framing
//! - [`encoder`] / [`decoder`]: the full pipeline
//! - [`scanner`]: multi-message extraction
//! - [`nonblocking`]: async wrappers for Tokio

/// Container format version
pub const VERSION: u32 = 2;

pub mod crypto;
pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod nonblocking;
pub mod scanner;
pub mod stego;

// Re-export commonly used types at the crate root
pub use crypto::{
    assess_password, CipherAlgorithm, CompressionAlgorithm, PasswordStrength, StrengthTier,
};
pub use decoder::{decode_message, inspect, DecodeError, DecodeOptions, DecodedMessage, ErrorKind};
pub use encoder::{
    encode_message, estimate_payload_size, EncodeOptions, EncodedMessage, EncoderError,
};
pub use frame::{FrameError, Header};
pub use scanner::{scan_messages, ScanError, ScanResult, ScannedMessage};
pub use stego::{normalize_anchor, DEFAULT_ANCHORS};
