//! Default tag/LM-token assignment for unknown-form nodes, keyed by
//! character category.

use serde::{Deserialize, Serialize};

use crate::character_definition::CharCategory;
use crate::pos::PosTag;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnknownEntry {
    pub tag: PosTag,
    pub lm_morpheme_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnknownDictionary {
    hangul: UnknownEntry,
    hanja: UnknownEntry,
    latin: UnknownEntry,
    digit: UnknownEntry,
    other: UnknownEntry,
}

impl UnknownDictionary {
    pub fn new(hangul: UnknownEntry, hanja: UnknownEntry, latin: UnknownEntry, digit: UnknownEntry, other: UnknownEntry) -> Self {
        UnknownDictionary { hangul, hanja, latin, digit, other }
    }

    pub fn entry_for(&self, category: CharCategory) -> UnknownEntry {
        match category {
            CharCategory::Hangul | CharCategory::HangulJamo => self.hangul,
            CharCategory::Hanja => self.hanja,
            CharCategory::Latin => self.latin,
            CharCategory::Digit => self.digit,
            CharCategory::Symbol | CharCategory::Space | CharCategory::Other => self.other,
        }
    }
}

impl Default for UnknownDictionary {
    fn default() -> Self {
        UnknownDictionary {
            hangul: UnknownEntry { tag: PosTag::Nf, lm_morpheme_id: 0 },
            hanja: UnknownEntry { tag: PosTag::Sh, lm_morpheme_id: 0 },
            latin: UnknownEntry { tag: PosTag::Sl, lm_morpheme_id: 0 },
            digit: UnknownEntry { tag: PosTag::Sn, lm_morpheme_id: 0 },
            other: UnknownEntry { tag: PosTag::Na, lm_morpheme_id: 0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_category_to_expected_default_tag() {
        let dict = UnknownDictionary::default();
        assert_eq!(dict.entry_for(CharCategory::Hangul).tag, PosTag::Nf);
        assert_eq!(dict.entry_for(CharCategory::Latin).tag, PosTag::Sl);
        assert_eq!(dict.entry_for(CharCategory::Digit).tag, PosTag::Sn);
    }
}
