//! Anchor characters.
//!
//! The anchor is the one visible character the hidden selectors hang off.
//! Decoders treat the first non-selector character as the anchor, so an
//! anchor must be a single character once any variation selectors (such as
//! the emoji presentation selector U+FE0F in "❤️") are removed.

use super::selector::is_selector;

/// Default anchor set, in the order offered to users.
pub const DEFAULT_ANCHORS: [char; 15] = [
    '😎', '✨', '❤', '🔒', '🔥', '🌟', '🎯', '💡', '🚀', '💎', '📌', '✅', '⚡', '🌈', '🌠',
];

/// Reduces an anchor string to its single visible character.
///
/// Returns `None` if nothing or more than one character remains after
/// dropping variation selectors.
pub fn normalize_anchor(anchor: &str) -> Option<char> {
    let mut visible = anchor.chars().filter(|&c| !is_selector(c));
    let first = visible.next()?;
    match visible.next() {
        Some(_) => None,
        None => Some(first),
    }
}

/// Normalizes a list of anchors, dropping invalid entries and duplicates
/// while keeping first-seen order.
pub fn normalize_anchors<S: AsRef<str>>(anchors: &[S]) -> Vec<char> {
    let mut normalized = Vec::with_capacity(anchors.len());
    for anchor in anchors {
        if let Some(c) = normalize_anchor(anchor.as_ref()) {
            if !normalized.contains(&c) {
                normalized.push(c);
            }
        }
    }
    normalized
}
