//! Async wrappers for use inside a Tokio runtime.
//!
//! Key derivation runs up to 200 000 PBKDF2 rounds, which is too long to
//! block an async executor thread. These wrappers move the work onto Tokio's
//! blocking pool; the results are identical to the synchronous functions.

use thiserror::Error;
use tokio::task::{spawn_blocking, JoinError};

use crate::decoder::{decode_message, DecodeError, DecodeOptions, DecodedMessage};
use crate::encoder::{encode_message, EncodeOptions, EncodedMessage, EncoderError};
use crate::scanner::{scan_messages, ScanError, ScanResult};

/// Failure of an offloaded operation.
#[derive(Error, Debug)]
pub enum TaskError<E> {
    /// The operation itself failed.
    #[error("{0}")]
    Failed(E),

    /// The blocking task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Join(#[from] JoinError),
}

impl<E> TaskError<E> {
    /// The operation's own error, if that is what failed.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Join(_) => None,
        }
    }
}

/// Async [`encode_message`].
pub async fn encode_message_async(
    plaintext: String,
    anchor: String,
    options: EncodeOptions,
) -> Result<EncodedMessage, TaskError<EncoderError>> {
    spawn_blocking(move || encode_message(&plaintext, &anchor, &options))
        .await?
        .map_err(TaskError::Failed)
}

/// Async [`decode_message`].
pub async fn decode_message_async(
    text: String,
    options: DecodeOptions,
) -> Result<DecodedMessage, TaskError<DecodeError>> {
    spawn_blocking(move || decode_message(&text, &options))
        .await?
        .map_err(TaskError::Failed)
}

/// Async [`scan_messages`].
pub async fn scan_messages_async(
    blob: String,
    known_anchors: Vec<String>,
    options: DecodeOptions,
) -> Result<ScanResult, TaskError<ScanError>> {
    spawn_blocking(move || scan_messages(&blob, &known_anchors, &options))
        .await?
        .map_err(TaskError::Failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::StrengthTier;

    #[tokio::test]
    async fn test_async_roundtrip() {
        let options = EncodeOptions::default()
            .with_password("pw")
            .with_strength(StrengthTier::Low);
        let encoded = encode_message_async("async hello".into(), "🚀".into(), options)
            .await
            .unwrap();

        let decoded = decode_message_async(encoded.text, DecodeOptions::default().with_password("pw"))
            .await
            .unwrap();
        assert_eq!(decoded.plaintext, "async hello");
    }

    #[tokio::test]
    async fn test_async_errors_pass_through() {
        let err = decode_message_async("no data".into(), DecodeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err.into_inner(), Some(DecodeError::NoHiddenData)));
    }

    #[tokio::test]
    async fn test_async_scan() {
        let a = encode_message("a", "💎", &EncodeOptions::default()).unwrap().text;
        let b = encode_message("b", "💎", &EncodeOptions::default()).unwrap().text;

        let result = scan_messages_async(format!("{} {}", a, b), vec!["💎".into()], DecodeOptions::default())
            .await
            .unwrap();
        assert_eq!(result.plaintexts().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
