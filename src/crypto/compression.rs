//! Payload compression for Emoji Cipher.
//!
//! Three interchangeable coders sit behind the same `compress`/`decompress`
//! pair:
//! - **RLE** (default): byte-run escape coding, `[0xFF, len, value]` tokens
//! - **LZW**: dictionary coder emitting little-endian 16-bit codes
//! - **DEFLATE**: via `flate2`
//!
//! Every hidden byte costs 3-4 UTF-8 bytes in the emitted text, so smaller
//! payloads matter more here than raw speed.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use flate2::read::{DeflateDecoder, DeflateEncoder};
use flate2::Compression;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Escape byte that introduces a run token.
pub const RUN_ESCAPE: u8 = 0xFF;

/// Longest run a single token can describe.
pub const MAX_RUN: usize = 255;

/// Runs longer than this are emitted as tokens.
const MIN_TOKEN_RUN: usize = 3;

/// LZW code space (codes are stored as u16).
const LZW_MAX_CODES: u32 = 1 << 16;

/// Upper bound on decompressed output when the caller gives no tighter one.
pub const MAX_DECOMPRESSED_SIZE: usize = 64 * 1024 * 1024;

/// Compression errors.
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Zero-length run token at offset {0}")]
    ZeroLengthRun(usize),

    #[error("Invalid LZW code {code} at position {position}")]
    InvalidCode { code: u16, position: usize },

    #[error("LZW stream has odd length {0}")]
    OddLength(usize),

    #[error("Unknown compression algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Decompressed data exceeds {limit} bytes")]
    SizeLimitExceeded { limit: usize },
}

/// Which coder produced a compressed payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// Byte-run escape coding.
    #[default]
    #[serde(rename = "RLE")]
    Rle,
    /// Lempel-Ziv-Welch with 16-bit codes.
    #[serde(rename = "LZW")]
    Lzw,
    /// Raw DEFLATE stream.
    #[serde(rename = "DEFLATE")]
    Deflate,
}

impl CompressionAlgorithm {
    /// Tag stored in the message header.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Rle => "RLE",
            Self::Lzw => "LZW",
            Self::Deflate => "DEFLATE",
        }
    }

    /// Compresses `data` with this algorithm.
    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        match self {
            Self::Rle => Ok(compress(data)),
            Self::Lzw => Ok(lzw_compress(data)),
            Self::Deflate => deflate_compress(data),
        }
    }

    /// Reverses [`CompressionAlgorithm::compress`], up to
    /// [`MAX_DECOMPRESSED_SIZE`] bytes of output.
    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        self.decompress_limited(data, MAX_DECOMPRESSED_SIZE)
    }

    /// Reverses [`CompressionAlgorithm::compress`], failing with
    /// [`CompressionError::SizeLimitExceeded`] once output passes `limit`.
    pub fn decompress_limited(self, data: &[u8], limit: usize) -> Result<Vec<u8>, CompressionError> {
        match self {
            Self::Rle => decompress_limited(data, limit),
            Self::Lzw => lzw_decompress(data, limit),
            Self::Deflate => deflate_decompress(data, limit),
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rle" | "run" => Ok(Self::Rle),
            "lzw" => Ok(Self::Lzw),
            "deflate" => Ok(Self::Deflate),
            _ => Err(CompressionError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Compresses data with byte-run escape coding.
///
/// Runs of more than three equal bytes (capped at 255 per token) become
/// `[0xFF, len, value]`; shorter runs are copied through. A literal `0xFF`
/// is always written as a token so the escape byte is never ambiguous.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let current = data[i];
        let count = data[i..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == current)
            .count();

        if count > MIN_TOKEN_RUN || current == RUN_ESCAPE {
            result.extend_from_slice(&[RUN_ESCAPE, count as u8, current]);
        } else {
            result.extend(std::iter::repeat(current).take(count));
        }

        i += count;
    }

    result
}

/// Decompresses data produced by [`compress`].
///
/// A `0xFF` followed by at least two bytes expands to `len` copies of
/// `value`; a trailing `0xFF` without room for a token is copied through.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    decompress_limited(data, MAX_DECOMPRESSED_SIZE)
}

/// [`decompress`] with an explicit output bound.
pub fn decompress_limited(data: &[u8], limit: usize) -> Result<Vec<u8>, CompressionError> {
    let mut result = Vec::with_capacity(data.len().min(limit));
    let mut i = 0;

    while i < data.len() {
        let (count, value, step) = if data[i] == RUN_ESCAPE && i + 2 < data.len() {
            let count = data[i + 1] as usize;
            if count == 0 {
                return Err(CompressionError::ZeroLengthRun(i));
            }
            (count, data[i + 2], 3)
        } else {
            (1, data[i], 1)
        };

        ensure_within(result.len() + count, limit)?;
        result.extend(std::iter::repeat(value).take(count));
        i += step;
    }

    Ok(result)
}

/// Compresses data with LZW, emitting little-endian u16 codes.
///
/// The dictionary is seeded with all single bytes and stops growing once the
/// 16-bit code space is exhausted.
pub fn lzw_compress(data: &[u8]) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }

    let mut dict: HashMap<Vec<u8>, u16> = (0..=255u8).map(|b| (vec![b], u16::from(b))).collect();
    let mut next_code: u32 = 256;
    let mut codes: Vec<u16> = Vec::new();
    let mut phrase: Vec<u8> = Vec::new();

    for &byte in data {
        phrase.push(byte);
        if dict.contains_key(&phrase) {
            continue;
        }

        let known = &phrase[..phrase.len() - 1];
        codes.push(dict[known]);
        if next_code < LZW_MAX_CODES {
            dict.insert(phrase.clone(), next_code as u16);
            next_code += 1;
        }
        phrase.clear();
        phrase.push(byte);
    }
    codes.push(dict[&phrase]);

    codes.iter().flat_map(|code| code.to_le_bytes()).collect()
}

/// Decompresses data produced by [`lzw_compress`].
///
/// Every dictionary entry is a prefix of the output plus one byte, so bounding
/// the output by `limit` also bounds the dictionary.
pub fn lzw_decompress(data: &[u8], limit: usize) -> Result<Vec<u8>, CompressionError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    if data.len() % 2 != 0 {
        return Err(CompressionError::OddLength(data.len()));
    }

    let codes: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    let mut dict: Vec<Vec<u8>> = (0..=255u8).map(|b| vec![b]).collect();

    let first = codes[0];
    if first > 255 {
        return Err(CompressionError::InvalidCode { code: first, position: 0 });
    }
    ensure_within(1, limit)?;
    let mut previous = dict[first as usize].clone();
    let mut result = previous.clone();

    for (position, &code) in codes.iter().enumerate().skip(1) {
        let entry = match dict.get(code as usize) {
            Some(entry) => entry.clone(),
            // The "cScSc" case: the code being defined right now.
            None if code as usize == dict.len() => {
                let mut entry = previous.clone();
                entry.push(previous[0]);
                entry
            }
            None => return Err(CompressionError::InvalidCode { code, position }),
        };

        ensure_within(result.len() + entry.len(), limit)?;
        result.extend_from_slice(&entry);
        if (dict.len() as u32) < LZW_MAX_CODES {
            let mut new_entry = previous;
            new_entry.push(entry[0]);
            dict.push(new_entry);
        }
        previous = entry;
    }

    Ok(result)
}

/// Compresses data as a raw DEFLATE stream.
pub fn deflate_compress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = DeflateEncoder::new(data, Compression::best());
    let mut compressed = Vec::new();

    encoder
        .read_to_end(&mut compressed)
        .map_err(|e| CompressionError::CompressionFailed(e.to_string()))?;

    Ok(compressed)
}

/// Decompresses a raw DEFLATE stream of at most `limit` bytes.
pub fn deflate_decompress(data: &[u8], limit: usize) -> Result<Vec<u8>, CompressionError> {
    // One byte past the limit is enough to tell an oversized stream apart.
    let mut decoder = DeflateDecoder::new(data).take((limit as u64).saturating_add(1));
    let mut decompressed = Vec::new();

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| CompressionError::DecompressionFailed(e.to_string()))?;
    ensure_within(decompressed.len(), limit)?;

    Ok(decompressed)
}

fn ensure_within(size: usize, limit: usize) -> Result<(), CompressionError> {
    if size > limit {
        return Err(CompressionError::SizeLimitExceeded { limit });
    }
    Ok(())
}
