//! Password-based authenticated encryption for Emoji Cipher.
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA256 key derivation with a random per-message salt
//! - AES-256-GCM (16-byte IV) or ChaCha20-Poly1305 (12-byte nonce)
//! - Fixed associated data binding ciphertexts to this format
//!
//! Salt, IV and iteration count travel in the message header, so decryption
//! needs only the password.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use chacha20poly1305::ChaCha20Poly1305;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

/// Associated data authenticated with every ciphertext.
pub const ASSOCIATED_DATA: &[u8] = b"EmojiCipherPro-v2.1";

/// Salt length for key derivation.
pub const SALT_SIZE: usize = 32;

/// Derived key length (256-bit).
pub const KEY_SIZE: usize = 32;

/// Authentication tag length shared by both AEADs.
pub const TAG_SIZE: usize = 16;

/// Iteration count used when a tier name is not recognized.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Highest iteration count accepted from a message header.
pub const MAX_ITERATIONS: u32 = 1_000_000;

/// AES-256-GCM with the 16-byte IV the format stores.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Errors that can occur during symmetric encryption.
#[derive(Error, Debug)]
pub enum SymmetricError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Authentication failed: wrong password or tampered ciphertext.
    #[error("Decryption failed, the password is probably wrong")]
    DecryptionFailed,

    #[error("Invalid IV length for {algorithm}: expected {expected}, got {got}")]
    InvalidIvLength {
        algorithm: CipherAlgorithm,
        expected: usize,
        got: usize,
    },

    #[error("Iteration count must be positive")]
    ZeroIterations,

    #[error("Iteration count {0} exceeds the maximum of {max}", max = MAX_ITERATIONS)]
    TooManyIterations(u32),

    #[error("Unknown cipher algorithm: {0}")]
    UnknownAlgorithm(String),
}

/// Key-derivation cost level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthTier {
    Low,
    Medium,
    #[default]
    High,
}

impl StrengthTier {
    /// PBKDF2 iteration count for this tier.
    pub fn iterations(self) -> u32 {
        match self {
            Self::Low => 50_000,
            Self::Medium => 100_000,
            Self::High => 200_000,
        }
    }

    /// Parses a tier name; anything unrecognized falls back to `Medium`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }
}

impl FromStr for StrengthTier {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for StrengthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// AEAD primitive used for the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherAlgorithm {
    #[default]
    #[serde(rename = "AES-GCM-256")]
    Aes256Gcm,
    #[serde(rename = "ChaCha20-Poly1305")]
    ChaCha20Poly1305,
}

impl CipherAlgorithm {
    /// Tag stored in the header's `algorithm` field.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Aes256Gcm => "AES-GCM-256",
            Self::ChaCha20Poly1305 => "ChaCha20-Poly1305",
        }
    }

    /// Looks up an algorithm by its header tag.
    pub fn from_tag(tag: &str) -> Result<Self, SymmetricError> {
        match tag {
            "AES-GCM-256" => Ok(Self::Aes256Gcm),
            "ChaCha20-Poly1305" => Ok(Self::ChaCha20Poly1305),
            other => Err(SymmetricError::UnknownAlgorithm(other.to_string())),
        }
    }

    /// IV / nonce length in bytes.
    pub fn iv_size(self) -> usize {
        match self {
            Self::Aes256Gcm => 16,
            Self::ChaCha20Poly1305 => 12,
        }
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for CipherAlgorithm {
    type Err = SymmetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aes-gcm" | "aes-gcm-256" | "aes" => Ok(Self::Aes256Gcm),
            "chacha20-poly1305" | "chacha20" | "chacha" => Ok(Self::ChaCha20Poly1305),
            _ => Err(SymmetricError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Ciphertext plus the parameters needed to decrypt it.
#[derive(Debug, Clone)]
pub struct EncryptedPayload {
    /// Ciphertext with the authentication tag appended.
    pub ciphertext: Vec<u8>,
    /// Key-derivation salt.
    pub salt: [u8; SALT_SIZE],
    /// AEAD IV / nonce, `algorithm.iv_size()` bytes.
    pub iv: Vec<u8>,
    /// PBKDF2 iteration count.
    pub iterations: u32,
    /// AEAD that produced the ciphertext.
    pub algorithm: CipherAlgorithm,
}

/// Derives a 256-bit key from a password with PBKDF2-HMAC-SHA256.
pub fn derive_key(
    password: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; KEY_SIZE]>, SymmetricError> {
    if iterations == 0 {
        return Err(SymmetricError::ZeroIterations);
    }
    if iterations > MAX_ITERATIONS {
        return Err(SymmetricError::TooManyIterations(iterations));
    }

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key[..]);
    Ok(key)
}

/// Encrypts data with a password.
///
/// A fresh salt and IV are drawn from the OS RNG on every call.
pub fn encrypt(
    plaintext: &[u8],
    password: &str,
    strength: StrengthTier,
    algorithm: CipherAlgorithm,
) -> Result<EncryptedPayload, SymmetricError> {
    let iterations = strength.iterations();

    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    let mut iv = vec![0u8; algorithm.iv_size()];
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(password, &salt, iterations)?;
    let payload = Payload {
        msg: plaintext,
        aad: ASSOCIATED_DATA,
    };

    let ciphertext = match algorithm {
        CipherAlgorithm::Aes256Gcm => {
            let cipher = Aes256Gcm16::new_from_slice(&key[..])
                .map_err(|e| SymmetricError::EncryptionFailed(e.to_string()))?;
            cipher.encrypt(aes_gcm::Nonce::<U16>::from_slice(&iv), payload)
        }
        CipherAlgorithm::ChaCha20Poly1305 => {
            let cipher = ChaCha20Poly1305::new_from_slice(&key[..])
                .map_err(|e| SymmetricError::EncryptionFailed(e.to_string()))?;
            cipher.encrypt(chacha20poly1305::Nonce::from_slice(&iv), payload)
        }
    }
    .map_err(|e| SymmetricError::EncryptionFailed(e.to_string()))?;

    Ok(EncryptedPayload {
        ciphertext,
        salt,
        iv,
        iterations,
        algorithm,
    })
}

/// Decrypts data produced by [`encrypt`].
///
/// Any authentication failure (wrong password, tampered ciphertext, wrong
/// salt or IV) is reported as [`SymmetricError::DecryptionFailed`].
pub fn decrypt(
    ciphertext: &[u8],
    salt: &[u8],
    iv: &[u8],
    password: &str,
    iterations: u32,
    algorithm: CipherAlgorithm,
) -> Result<Vec<u8>, SymmetricError> {
    if iv.len() != algorithm.iv_size() {
        return Err(SymmetricError::InvalidIvLength {
            algorithm,
            expected: algorithm.iv_size(),
            got: iv.len(),
        });
    }
    if ciphertext.len() < TAG_SIZE {
        return Err(SymmetricError::DecryptionFailed);
    }

    let key = derive_key(password, salt, iterations)?;
    let payload = Payload {
        msg: ciphertext,
        aad: ASSOCIATED_DATA,
    };

    match algorithm {
        CipherAlgorithm::Aes256Gcm => {
            let cipher = Aes256Gcm16::new_from_slice(&key[..])
                .map_err(|_| SymmetricError::DecryptionFailed)?;
            cipher.decrypt(aes_gcm::Nonce::<U16>::from_slice(iv), payload)
        }
        CipherAlgorithm::ChaCha20Poly1305 => {
            let cipher = ChaCha20Poly1305::new_from_slice(&key[..])
                .map_err(|_| SymmetricError::DecryptionFailed)?;
            cipher.decrypt(chacha20poly1305::Nonce::from_slice(iv), payload)
        }
    }
    .map_err(|_| SymmetricError::DecryptionFailed)
}
