//! The `Morpheme` half of the morpheme/form data model.

use serde::{Deserialize, Serialize};

use crate::form::FormId;
use crate::pos::PosTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MorphemeId(pub u32);

/// Constraint a morpheme places on the *preceding* form's last syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VowelConstraint {
    None,
    /// Preceding form must end in a vowel.
    Vowel,
    /// Preceding form must end in a consonant (have a coda).
    NonVowel,
    /// Either, but the realized allomorph differs (tracked via `group_id`).
    Vocalic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolarityConstraint {
    None,
    Yang,
    Eum,
}

/// One child of a chunked (pre-analyzed) morpheme, e.g. one morpheme of
/// 사귀+었+다 inside the chunked analysis of "사겼다".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub morpheme: MorphemeId,
    pub byte_start: u32,
    pub byte_end: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Morpheme {
    pub surface_form: FormId,
    pub tag: PosTag,
    /// Homograph disambiguator.
    pub sense_id: u16,
    pub vowel_constraint: VowelConstraint,
    pub polarity_constraint: PolarityConstraint,
    /// Nonzero iff this morpheme is a partial piece that must fuse with a
    /// preceding partial sharing the same socket.
    pub combine_socket: u16,
    /// Signed offset (in morpheme-table indices) to the fully-combined
    /// sibling, or 0 if this morpheme has none.
    pub combined: i32,
    pub chunks: Option<Vec<Chunk>>,
    /// The token ID used when querying the language model; multiple
    /// dictionary morphemes (allomorphs) may share one LM token.
    pub lm_morpheme_id: u32,
    /// Allomorph group, ordered by realization priority.
    pub group_id: u32,
    pub user_score: f32,
    /// Bitmask over the same dialect bit layout as `kiwi::options::Dialects`
    /// (kept as a raw `u32` here so `kiwi-dictionary` doesn't need to depend
    /// on `kiwi`'s bitflags type); 0 means standard-only.
    pub dialect_bits: u32,
}

impl Morpheme {
    pub fn is_partial(&self) -> bool {
        self.combine_socket != 0
    }

    pub fn is_chunked(&self) -> bool {
        self.chunks.is_some()
    }

    /// Resolves `combined` relative to this morpheme's own table index.
    pub fn combined_index(&self, self_index: u32) -> Option<u32> {
        if self.combined == 0 {
            return None;
        }
        let resolved = self_index as i64 + self.combined as i64;
        if resolved < 0 {
            None
        } else {
            Some(resolved as u32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Morpheme {
        Morpheme {
            surface_form: FormId(0),
            tag: PosTag::Vv,
            sense_id: 0,
            vowel_constraint: VowelConstraint::None,
            polarity_constraint: PolarityConstraint::None,
            combine_socket: 0,
            combined: 0,
            chunks: None,
            lm_morpheme_id: 1,
            group_id: 0,
            user_score: 0.0,
            dialect_bits: 0,
        }
    }

    #[test]
    fn combined_index_resolves_signed_offset() {
        let mut m = sample();
        m.combined = 2;
        assert_eq!(m.combined_index(5), Some(7));
        m.combined = -3;
        assert_eq!(m.combined_index(5), Some(2));
        m.combined = 0;
        assert_eq!(m.combined_index(5), None);
    }

    #[test]
    fn partial_detection() {
        let mut m = sample();
        assert!(!m.is_partial());
        m.combine_socket = 3;
        assert!(m.is_partial());
    }
}
