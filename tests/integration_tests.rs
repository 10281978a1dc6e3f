//! Integration tests for Emoji Cipher
//!
//! Note: only a missing password is retryable. Every other decode error
//! is final for the given text.
//!
//! Covered:
//! - Round trips across compression and encryption settings
//! - Container layout as seen through the public API
//! - Structural rejection of damaged input
//! - Multi-message scanning

use std::fs;

use emoji_cipher::crypto::crc32;
use emoji_cipher::frame::{frame, Header, MARKER, SEPARATOR};
use emoji_cipher::stego::selector;
use emoji_cipher::{
    decode_message, encode_message, inspect, scan_messages, CipherAlgorithm,
    CompressionAlgorithm, DecodeError, DecodeOptions, EncodeOptions, ErrorKind, ScanError,
    StrengthTier, DEFAULT_ANCHORS,
};

const PASSWORD: &str = "Tr0ub4dor&3";

fn locked() -> EncodeOptions {
    EncodeOptions::default()
        .with_password(PASSWORD)
        .with_strength(StrengthTier::Low)
}

fn unlock() -> DecodeOptions {
    DecodeOptions::default().with_password(PASSWORD)
}

fn sample_messages() -> Vec<String> {
    vec![
        String::new(),
        "hello".to_string(),
        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_string(),
        "Héllo wörld, 你好, مرحبا 🎉🎉🎉".to_string(),
        format!("tricky {}{} inside", MARKER, SEPARATOR),
        "The quick brown fox jumps over the lazy dog. ".repeat(40),
        "ÿÿÿÿÿÿ".to_string(),
    ]
}

/// Test every compression and encryption combination
#[test]
fn test_roundtrip_all_settings() {
    let algorithms = [
        CompressionAlgorithm::Rle,
        CompressionAlgorithm::Lzw,
        CompressionAlgorithm::Deflate,
    ];

    for message in sample_messages() {
        for algorithm in algorithms {
            for compress in [true, false] {
                for encrypt in [true, false] {
                    let mut options = if encrypt { locked() } else { EncodeOptions::default() };
                    options = options.with_compression(algorithm);
                    if !compress {
                        options = options.without_compression();
                    }

                    let encoded = encode_message(&message, "😎", &options).unwrap();
                    let decoded = decode_message(&encoded.text, &unlock()).unwrap();

                    assert_eq!(
                        decoded.plaintext, message,
                        "algorithm={} compress={} encrypt={}",
                        algorithm, compress, encrypt
                    );
                    assert!(decoded.checksum_ok);
                    assert_eq!(decoded.header.is_encrypted(), encrypt);
                    assert_eq!(decoded.header.is_compressed(), compress);
                }
            }
        }
    }
}

/// Test both ciphers end to end
#[test]
fn test_roundtrip_both_ciphers() {
    for cipher in [CipherAlgorithm::Aes256Gcm, CipherAlgorithm::ChaCha20Poly1305] {
        let options = locked().with_cipher(cipher);
        let encoded = encode_message("cipher check", "🔒", &options).unwrap();

        assert_eq!(encoded.header.algorithm, cipher.tag());
        assert_eq!(
            encoded.header.iv_bytes().unwrap().len(),
            cipher.iv_size()
        );

        let decoded = decode_message(&encoded.text, &unlock()).unwrap();
        assert_eq!(decoded.plaintext, "cipher check");
    }
}

/// Test the output is the anchor followed only by selectors
#[test]
fn test_output_is_anchor_plus_selectors() {
    let encoded = encode_message("invisible", "✨", &EncodeOptions::default()).unwrap();

    let mut chars = encoded.text.chars();
    assert_eq!(chars.next(), Some('✨'));
    assert!(chars.all(selector::is_selector));
    assert_eq!(encoded.text.chars().count(), 1 + encoded.hidden_len());
}

/// Test the hidden bytes start with the marker and hold a JSON header
#[test]
fn test_container_layout() {
    let encoded = encode_message("hello", "😎", &EncodeOptions::default().without_compression())
        .unwrap();
    let container = selector::decode(&encoded.text);

    assert_eq!(&container[..2], &[0xD8, 0x9C]);
    assert_eq!(container[2], b'{');
    assert!(container.ends_with(b"\xCD\x8Fhello"));

    let header = inspect(&encoded.text).unwrap();
    assert_eq!(header.version, 2);
    assert_eq!(header.crc32, crc32(b"hello"));
    assert_eq!(header.original_size, 5);
    assert_eq!(header.compressed_size, 5);
    assert_eq!(header.encoding, "UTF-8");
}

/// Test header sizes for an encrypted, compressed message
#[test]
fn test_encrypted_header_sizes() {
    let message = "z".repeat(100);
    let encoded = encode_message(&message, "🔥", &locked()).unwrap();
    let header = &encoded.header;

    assert_eq!(header.original_size, 100);
    // Run coding: 100 -> 3 bytes, then the 16 byte tag
    assert_eq!(header.compressed_size, 3 + 16);
    assert_eq!(header.iterations, 50_000);
    assert_eq!(header.salt_bytes().unwrap().len(), 32);
}

/// Test the anchor keeps or drops its presentation selector consistently
#[test]
fn test_anchor_with_presentation_selector() {
    let encoded = encode_message("love", "❤\u{FE0F}", &EncodeOptions::default()).unwrap();
    assert!(encoded.text.starts_with('❤'));

    let decoded = decode_message(&encoded.text, &DecodeOptions::default()).unwrap();
    assert_eq!(decoded.plaintext, "love");
}

/// Test multi-character anchors are rejected
#[test]
fn test_invalid_anchor() {
    assert!(encode_message("x", "ab", &EncodeOptions::default()).is_err());
    assert!(encode_message("x", "", &EncodeOptions::default()).is_err());
}

/// Test encrypted messages ask for a password first
#[test]
fn test_password_required_is_retryable() {
    let encoded = encode_message("secret", "🔒", &locked()).unwrap();

    let err = decode_message(&encoded.text, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, DecodeError::PasswordRequired));
    assert!(err.is_retryable());

    let decoded = decode_message(&encoded.text, &unlock()).unwrap();
    assert_eq!(decoded.plaintext, "secret");
}

/// Test a wrong password is an authentication failure
#[test]
fn test_wrong_password() {
    let encoded = encode_message("secret", "🔒", &locked()).unwrap();

    let err = decode_message(
        &encoded.text,
        &DecodeOptions::default().with_password("nope"),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert!(!err.is_retryable());
}

/// Test plain text and bare emoji are structural failures
#[test]
fn test_no_hidden_data() {
    for text in ["", "plain text", "😎", "😎 and more"] {
        let err = decode_message(text, &DecodeOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural, "input {:?}", text);
    }
}

/// Test truncated messages fail structurally or on payload checks
#[test]
fn test_truncated_message() {
    let encoded = encode_message("truncate me", "😎", &EncodeOptions::default()).unwrap();
    let chars: Vec<char> = encoded.text.chars().collect();

    // Cut inside the header
    let cut: String = chars[..10].iter().collect();
    let err = decode_message(&cut, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, DecodeError::SeparatorNotFound));
}

/// Test tampering is caught by the checksum
#[test]
fn test_tampered_payload() {
    let encoded = encode_message("abc", "😎", &EncodeOptions::default().without_compression())
        .unwrap();
    let mut container = selector::decode(&encoded.text);
    let last = container.len() - 1;
    container[last] = b'd';
    let tampered = selector::encode("😎", &container);

    let lenient = decode_message(&tampered, &DecodeOptions::default()).unwrap();
    assert_eq!(lenient.plaintext, "abd");
    assert!(!lenient.checksum_ok);

    let err = decode_message(&tampered, &DecodeOptions::default().verify_checksum(true))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
}

/// Test trailing visible text does not disturb decoding
#[test]
fn test_trailing_text_ignored() {
    let encoded = encode_message("tail", "🌟", &EncodeOptions::default()).unwrap();
    let text = format!("{} and then some words", encoded.text);

    let decoded = decode_message(&text, &DecodeOptions::default()).unwrap();
    assert_eq!(decoded.plaintext, "tail");
}

/// Test scanning a chat log with several messages
#[test]
fn test_scan_chat_log() {
    let first = encode_message("first", "😎", &EncodeOptions::default()).unwrap();
    let second = encode_message("second", "🚀", &locked()).unwrap();
    let third = encode_message("third", "😎", &EncodeOptions::default()).unwrap();

    let log = format!(
        "alice: {}\nbob: 😎 lol\ncarol: {}\ndave: {}\n",
        first.text, second.text, third.text
    );

    let anchors: Vec<String> = DEFAULT_ANCHORS.iter().map(|c| c.to_string()).collect();
    let result = scan_messages(&log, &anchors, &unlock()).unwrap();

    assert_eq!(result.plaintexts().collect::<Vec<_>>(), vec!["first", "second", "third"]);
    assert_eq!(result.total_original_size(), 5 + 6 + 5);
}

/// Test scan stops at the first locked message without a password
#[test]
fn test_scan_password_abort() {
    let log = format!(
        "{} {} {} {}",
        encode_message("one", "✨", &EncodeOptions::default()).unwrap().text,
        encode_message("two", "✨", &EncodeOptions::default()).unwrap().text,
        encode_message("three", "✨", &EncodeOptions::default()).unwrap().text,
        encode_message("locked", "🔒", &locked()).unwrap().text,
    );

    let err = scan_messages(&log, &["✨", "🔒"], &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, ScanError::PasswordRequired { .. }));

    let result = scan_messages(&log, &["✨", "🔒"], &unlock()).unwrap();
    assert_eq!(result.len(), 4);
}

/// Test a message whose LZW payload outgrows its header is skipped by the scanner
#[test]
fn test_scan_skips_oversized_expansion() {
    let payload: Vec<u8> = std::iter::once(0x41u16)
        .chain(256..5256)
        .flat_map(|code| code.to_le_bytes())
        .collect();
    let header = Header {
        version: 2,
        timestamp: 0,
        compression: 1,
        encryption: 0,
        crc32: 0,
        original_size: 1,
        compressed_size: payload.len(),
        salt: String::new(),
        iv: String::new(),
        iterations: 0,
        algorithm: CipherAlgorithm::default().tag().to_string(),
        encoding: "UTF-8".to_string(),
        compression_algorithm: Some(CompressionAlgorithm::Lzw),
    };
    let bomb = selector::encode("😎", &frame(&header, &payload).unwrap());

    let err = decode_message(&bomb, &DecodeOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Compression);

    let genuine = encode_message("real one", "😎", &EncodeOptions::default()).unwrap();
    let log = format!("{} then {}", bomb, genuine.text);
    let result = scan_messages(&log, &["😎"], &DecodeOptions::default()).unwrap();
    assert_eq!(result.plaintexts().collect::<Vec<_>>(), vec!["real one"]);
}

/// Test encoded text survives a trip through a file
#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("message.txt");

    let encoded = encode_message("stored on disk", "💎", &locked()).unwrap();
    fs::write(&path, &encoded.text).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let decoded = decode_message(&text, &unlock()).unwrap();
    assert_eq!(decoded.plaintext, "stored on disk");
}

/// Test inspect reads the header of a locked message without a password
#[test]
fn test_inspect_locked_message() {
    let encoded = encode_message("hidden", "🎯", &locked().with_compression(CompressionAlgorithm::Lzw))
        .unwrap();

    let header = inspect(&encoded.text).unwrap();
    assert!(header.is_encrypted());
    assert_eq!(header.compression_algorithm(), CompressionAlgorithm::Lzw);
    assert_eq!(header.iterations, StrengthTier::Low.iterations());
}
