//! Payload transforms for Emoji Cipher.
//!
//! This module provides:
//! - Compression (run escape coding, LZW, DEFLATE)
//! - Password-based authenticated encryption (PBKDF2 + AES-GCM / ChaCha20-Poly1305)
//! - CRC-32 checksum of the plaintext
//! - Password strength estimate

pub mod checksum;
pub mod compression;
pub mod strength;
pub mod symmetric;

pub use checksum::crc32;
pub use compression::{
    compress, decompress, CompressionAlgorithm, CompressionError, MAX_DECOMPRESSED_SIZE,
};
pub use strength::{assess_password, password_score, PasswordStrength};
pub use symmetric::{
    decrypt, derive_key, encrypt, CipherAlgorithm, EncryptedPayload, StrengthTier, SymmetricError,
};
