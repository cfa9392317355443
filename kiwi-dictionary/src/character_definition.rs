//! Per-character category classification, used by the lattice builder to
//! decide how to group unmatched runs into unknown-form nodes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharCategory {
    Hangul,
    /// A Jamo coda code point (the second half of a split syllable).
    HangulJamo,
    Hanja,
    Latin,
    Digit,
    Symbol,
    Space,
    Other,
}

impl CharCategory {
    pub fn classify(c: char) -> CharCategory {
        let code = c as u32;
        if (0xAC00..=0xD7A3).contains(&code) {
            CharCategory::Hangul
        } else if (0x11A8..=0x11C2).contains(&code) {
            CharCategory::HangulJamo
        } else if (0x4E00..=0x9FFF).contains(&code) {
            CharCategory::Hanja
        } else if c.is_ascii_alphabetic() || (0x00C0..=0x024F).contains(&code) {
            CharCategory::Latin
        } else if c.is_ascii_digit() {
            CharCategory::Digit
        } else if c.is_whitespace() {
            CharCategory::Space
        } else if c.is_ascii_punctuation() || (0x3000..=0x303F).contains(&code) {
            CharCategory::Symbol
        } else {
            CharCategory::Other
        }
    }

    /// Whether a run of this category is greedily grouped into one
    /// unknown-form node (`group`) vs. emitted one character at a time
    /// (`invoke` without `group`).
    pub fn groups_runs(self) -> bool {
        !matches!(self, CharCategory::Symbol | CharCategory::Space)
    }

    /// Maximum run length grouped into a single unknown-form node before
    /// the lattice builder forces a split, bounding worst-case node count.
    pub fn max_run_length(self) -> usize {
        match self {
            CharCategory::Hangul | CharCategory::HangulJamo => 8,
            CharCategory::Latin => 24,
            CharCategory::Digit => 24,
            CharCategory::Hanja => 6,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_categories() {
        assert_eq!(CharCategory::classify('학'), CharCategory::Hangul);
        assert_eq!(CharCategory::classify('a'), CharCategory::Latin);
        assert_eq!(CharCategory::classify('5'), CharCategory::Digit);
        assert_eq!(CharCategory::classify(' '), CharCategory::Space);
        assert_eq!(CharCategory::classify('!'), CharCategory::Symbol);
    }

    #[test]
    fn symbols_and_spaces_do_not_group() {
        assert!(!CharCategory::Symbol.groups_runs());
        assert!(!CharCategory::Space.groups_runs());
        assert!(CharCategory::Hangul.groups_runs());
    }
}
