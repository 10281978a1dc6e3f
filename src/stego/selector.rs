//! Variation-selector byte channel.
//!
//! Every byte is carried by one invisible Unicode variation selector placed
//! after a visible anchor character:
//! - bytes `0..16` use VS1..VS16 (`U+FE00..=U+FE0F`)
//! - bytes `16..256` use VS17..VS256 (`U+E0100..=U+E01EF`)
//!
//! Renderers attach the selectors to the anchor glyph, so the text looks like
//! the anchor alone.

/// First code point of the Variation Selectors block (VS1).
pub const VARIATION_SELECTOR_START: u32 = 0xFE00;
/// Last code point of the Variation Selectors block (VS16).
pub const VARIATION_SELECTOR_END: u32 = 0xFE0F;
/// First code point of the Variation Selectors Supplement block (VS17).
pub const VARIATION_SELECTOR_SUPPLEMENT_START: u32 = 0xE0100;
/// Last code point of the Variation Selectors Supplement block (VS256).
pub const VARIATION_SELECTOR_SUPPLEMENT_END: u32 = 0xE01EF;

/// Number of byte values carried by the first bank.
const LOW_BANK_SIZE: u8 = 16;

/// Maps a byte to its variation selector.
pub fn to_selector(byte: u8) -> char {
    let code_point = if byte < LOW_BANK_SIZE {
        VARIATION_SELECTOR_START + u32::from(byte)
    } else {
        VARIATION_SELECTOR_SUPPLEMENT_START + u32::from(byte - LOW_BANK_SIZE)
    };
    // Both banks lie outside the surrogate range, so the conversion is total.
    char::from_u32(code_point).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Maps a variation selector back to its byte.
///
/// Returns `None` for any character that is not a selector; decoders use this
/// to find where the hidden run ends.
pub fn from_selector(c: char) -> Option<u8> {
    let code_point = u32::from(c);
    match code_point {
        VARIATION_SELECTOR_START..=VARIATION_SELECTOR_END => {
            Some((code_point - VARIATION_SELECTOR_START) as u8)
        }
        VARIATION_SELECTOR_SUPPLEMENT_START..=VARIATION_SELECTOR_SUPPLEMENT_END => {
            Some((code_point - VARIATION_SELECTOR_SUPPLEMENT_START) as u8 + LOW_BANK_SIZE)
        }
        _ => None,
    }
}

/// Returns true if `c` is in either selector bank.
pub fn is_selector(c: char) -> bool {
    from_selector(c).is_some()
}

/// Appends one selector per byte to `anchor`.
pub fn encode(anchor: &str, bytes: &[u8]) -> String {
    // Supplement selectors take 4 UTF-8 bytes, low-bank ones 3.
    let mut encoded = String::with_capacity(anchor.len() + bytes.len() * 4);
    encoded.push_str(anchor);
    encoded.extend(bytes.iter().copied().map(to_selector));
    encoded
}

/// Extracts the bytes hidden behind the first anchor in `text`.
///
/// Leading selectors are skipped, the first non-selector character is taken
/// as the anchor, and the selectors directly after it are decoded until the
/// next non-selector character or the end of the text.
///
/// Never fails: malformed input yields whatever prefix could be read, which
/// may be empty.
pub fn decode(text: &str) -> Vec<u8> {
    let mut chars = text.chars().skip_while(|&c| is_selector(c));

    // Consume the anchor itself.
    if chars.next().is_none() {
        return Vec::new();
    }

    chars.map_while(from_selector).collect()
}
