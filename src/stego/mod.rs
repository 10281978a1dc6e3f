//! Steganographic byte channel.
//!
//! Supports:
//! - Byte <-> variation selector mapping
//! - Anchor normalization and the default anchor set

pub mod anchor;
pub mod selector;

pub use anchor::{normalize_anchor, normalize_anchors, DEFAULT_ANCHORS};
pub use selector::{from_selector, is_selector, to_selector};
