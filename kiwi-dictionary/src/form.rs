//! The `Form` half of the morpheme/form data model — a normalized
//! surface string plus its candidate morphemes and precomputed features.

use serde::{Deserialize, Serialize};

use crate::morpheme::MorphemeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormId(pub u32);

/// Vowel-harmony classification of a form's last syllable, tested against
/// a following morpheme's [`crate::morpheme::VowelConstraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VowelClass {
    /// Last syllable has no coda (ends in a vowel).
    Vowel,
    /// Last syllable has a coda (ends in a consonant).
    NonVowel,
}

/// Yang (bright/positive) vs. eum (dark/negative) vowel harmony class of a
/// form's last syllable, used by verb-ending polarity constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    Yang,
    Eum,
    /// Neutral vowels (이, 의, …) that don't participate in harmony.
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    /// Normalized (Jamo-split) surface string.
    pub normalized: String,
    pub candidates: Vec<MorphemeId>,
    pub vowel_class: VowelClass,
    pub polarity: Polarity,
    /// A following Jamo coda (Z-coda) may attach directly to this form.
    pub z_coda_appendable: bool,
    /// A following sai-siot may attach directly to this form.
    pub z_siot_appendable: bool,
    /// Bucket for case/whitespace-insensitive equality grouping.
    pub hash_bucket: u64,
}

impl Form {
    pub fn new(normalized: String, candidates: Vec<MorphemeId>) -> Self {
        let (vowel_class, polarity) = last_syllable_features(&normalized);
        let hash_bucket = bucket_hash(&normalized);
        Form {
            normalized,
            candidates,
            vowel_class,
            polarity,
            z_coda_appendable: false,
            z_siot_appendable: false,
            hash_bucket,
        }
    }
}

const YANG_VOWELS: &[char] = &['ㅏ', 'ㅗ'];
const EUM_VOWELS: &[char] = &['ㅓ', 'ㅜ', 'ㅡ'];

/// Classifies the last syllable of a *normalized* (Jamo-split) surface
/// string. Since normalization splits the coda out into a trailing Jamo
/// code point, a form "has a coda" iff its last code point falls in the
/// coda range, and otherwise is a bare precomposed syllable ending in a
/// vowel.
fn last_syllable_features(normalized: &str) -> (VowelClass, Polarity) {
    let last = match normalized.chars().last() {
        Some(c) => c,
        None => return (VowelClass::Vowel, Polarity::Neutral),
    };
    let code = last as u32;
    if (0x11A8..=0x11C2).contains(&code) {
        return (VowelClass::NonVowel, Polarity::Neutral);
    }
    if !(0xAC00..=0xD7A3).contains(&code) {
        return (VowelClass::Vowel, Polarity::Neutral);
    }
    let jungseong_index = ((code - 0xAC00) / 28) % 21;
    // Jungseong table index: 0=ㅏ 1=ㅐ 2=ㅑ 3=ㅒ 4=ㅓ 5=ㅔ 6=ㅕ 7=ㅖ 8=ㅗ ...
    let polarity = match jungseong_index {
        0 | 8 => Polarity::Yang,
        4 | 12 | 18 => Polarity::Eum,
        _ => Polarity::Neutral,
    };
    let _ = (YANG_VOWELS, EUM_VOWELS); // documents the table above; values are index-coded, not char-compared
    (VowelClass::Vowel, polarity)
}

fn bucket_hash(s: &str) -> u64 {
    // FNV-1a over the case/whitespace-collapsed string.
    let folded = crate::hangul::collapse_whitespace(&s.to_lowercase());
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in folded.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vowel_class_detects_coda() {
        let (class, _) = last_syllable_features("하\u{11A8}");
        assert_eq!(class, VowelClass::NonVowel);
        let (class, _) = last_syllable_features("가");
        assert_eq!(class, VowelClass::Vowel);
    }

    #[test]
    fn equal_surfaces_share_a_bucket() {
        let a = bucket_hash("Hello  World");
        let b = bucket_hash("hello world");
        assert_eq!(a, b);
    }
}
