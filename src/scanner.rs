//! Multi-message scanner.
//!
//! Finds every occurrence of a known anchor in a larger text and tries to
//! decode a message starting at each one. Each candidate is decoded against
//! the whole remainder of the text, independently of the others.
//!
//! Candidates that fail for structural, authentication, compression or
//! encoding reasons are skipped. A candidate that needs a password stops the
//! scan: until a password is supplied the message count cannot be trusted.

use thiserror::Error;
use tracing::{debug, trace};

use crate::decoder::{decode_message, DecodeError, DecodeOptions, ErrorKind};
use crate::stego::normalize_anchors;

/// Errors that abort a scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Message at byte offset {offset} is password protected, a password is required")]
    PasswordRequired {
        /// Byte offset of the anchor of the protected message.
        offset: usize,
    },
}

/// One message found by [`scan_messages`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedMessage {
    /// Byte offset of the anchor in the scanned text.
    pub offset: usize,
    /// The anchor the message was hidden behind.
    pub anchor: char,
    /// The recovered message.
    pub plaintext: String,
    /// Plaintext size recorded in the header.
    pub original_size: usize,
    /// Payload size recorded in the header.
    pub compressed_size: usize,
}

/// Messages found in a text, in left-to-right order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub messages: Vec<ScannedMessage>,
}

impl ScanResult {
    /// Number of messages found.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if nothing was found.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Sum of the plaintext sizes.
    pub fn total_original_size(&self) -> usize {
        self.messages.iter().map(|m| m.original_size).sum()
    }

    /// Sum of the payload sizes.
    pub fn total_compressed_size(&self) -> usize {
        self.messages.iter().map(|m| m.compressed_size).sum()
    }

    /// Plaintexts in order.
    pub fn plaintexts(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(|m| m.plaintext.as_str())
    }
}

impl IntoIterator for ScanResult {
    type Item = ScannedMessage;
    type IntoIter = std::vec::IntoIter<ScannedMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

/// Decodes every message hidden behind any of `known_anchors` in `blob`.
///
/// Anchors are normalized like encoder anchors (variation selectors removed,
/// must be one character); invalid entries are ignored.
pub fn scan_messages<S: AsRef<str>>(
    blob: &str,
    known_anchors: &[S],
    options: &DecodeOptions,
) -> Result<ScanResult, ScanError> {
    let anchors = normalize_anchors(known_anchors);
    let mut result = ScanResult::default();

    let candidates = blob.char_indices().filter(|(_, c)| anchors.contains(c));
    let mut candidate_count = 0usize;

    for (offset, anchor) in candidates {
        candidate_count += 1;
        match decode_message(&blob[offset..], options) {
            Ok(decoded) => result.messages.push(ScannedMessage {
                offset,
                anchor,
                plaintext: decoded.plaintext,
                original_size: decoded.original_size,
                compressed_size: decoded.compressed_size,
            }),
            Err(DecodeError::PasswordRequired) => {
                debug!(offset, "scan stopped at password protected message");
                return Err(ScanError::PasswordRequired { offset });
            }
            Err(err) => skip_candidate(offset, &err),
        }
    }

    debug!(
        candidates = candidate_count,
        found = result.len(),
        "scan complete"
    );
    Ok(result)
}

fn skip_candidate(offset: usize, err: &DecodeError) {
    match err.kind() {
        ErrorKind::Structural => trace!(offset, %err, "no message at candidate"),
        _ => debug!(offset, %err, "skipping undecodable message"),
    }
}
