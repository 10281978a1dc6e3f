//! CRC-32 (ISO-HDLC) over the plaintext bytes.
//!
//! Reflected polynomial `0xEDB88320`, initial value and final XOR
//! `0xFFFFFFFF`, as computed by `crc32fast`.

/// Computes the CRC-32 of `data`.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Computes the CRC-32 of the UTF-8 bytes of `text`.
pub fn crc32_str(text: &str) -> u32 {
    crc32(text.as_bytes())
}

/// Returns true if `text` hashes to `expected`.
pub fn verify(text: &str, expected: u32) -> bool {
    crc32_str(text) == expected
}
