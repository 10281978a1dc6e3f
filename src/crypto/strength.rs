//! Password strength estimate.
//!
//! A coarse score, one point per criterion met: at least 8 characters, at
//! least 12 characters, a lowercase letter, an uppercase letter, a digit and
//! any other character.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse password strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PasswordStrength {
    VeryWeak,
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl PasswordStrength {
    fn from_score(score: u8) -> Self {
        match score {
            0 => Self::VeryWeak,
            1..=2 => Self::Weak,
            3..=4 => Self::Medium,
            5 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::VeryWeak => "very weak",
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
            Self::VeryStrong => "very strong",
        })
    }
}

/// Scores a password from 0 to 6.
pub fn password_score(password: &str) -> u8 {
    let len = password.chars().count();
    let checks = [
        len >= 8,
        len >= 12,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    checks.iter().filter(|&&met| met).count() as u8
}

/// Rates a password.
pub fn assess_password(password: &str) -> PasswordStrength {
    PasswordStrength::from_score(password_score(password))
}
