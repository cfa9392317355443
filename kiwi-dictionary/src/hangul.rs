//! Canonicalize input text into normalized Jamo-split code units, with
//! a position map back to the original string.

use crate::error::{KiwiDictionaryErrorKind, KiwiDictionaryResult};

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLE_END: u32 = 0xD7A3;
const JONGSEONG_COUNT: u32 = 28;
const JUNGSEONG_COUNT: u32 = 21;
const CODA_BASE: u32 = 0x11A8;
const CODA_END: u32 = 0x11C2;

/// A code sequence produced by [`normalize`] plus the map back to the
/// original string's UTF-16 offsets.
pub struct Normalized {
    pub chars: Vec<char>,
    /// `pos_map[i]` is the UTF-16 offset of `chars[i]` in the source text.
    pub pos_map: Vec<u32>,
}

impl Normalized {
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Splits a syllable with a non-zero coda into `(coda_less_syllable, coda_jamo)`.
fn split_syllable(c: char) -> Option<(char, char)> {
    let code = c as u32;
    if !(SYLLABLE_BASE..=SYLLABLE_END).contains(&code) {
        return None;
    }
    let offset = code - SYLLABLE_BASE;
    let coda_index = offset % JONGSEONG_COUNT;
    if coda_index == 0 {
        return None;
    }
    let coda_less = char::from_u32(code - coda_index)?;
    let coda = char::from_u32(CODA_BASE + coda_index - 1)?;
    Some((coda_less, coda))
}

/// Recomposes a coda-less syllable followed by a coda jamo back into one
/// precomposed syllable, if the pairing is valid.
fn join_coda(base: char, coda: char) -> Option<char> {
    let base_code = base as u32;
    let coda_code = coda as u32;
    if !(SYLLABLE_BASE..=SYLLABLE_END).contains(&base_code) {
        return None;
    }
    if (base_code - SYLLABLE_BASE) % JONGSEONG_COUNT != 0 {
        // base already carries a coda; can't attach another
        return None;
    }
    if !(CODA_BASE..=CODA_END).contains(&coda_code) {
        return None;
    }
    let coda_index = coda_code - CODA_BASE + 1;
    char::from_u32(base_code + coda_index)
}

fn utf16_len(c: char) -> u32 {
    c.len_utf16() as u32
}

/// Normalizes a well-formed UTF-8 Rust string. Every precomposed syllable
/// with a non-empty coda is split into coda-less-syllable + coda jamo;
/// everything else passes through unchanged. Whitespace is left intact
/// here — whitespace-run collapsing only happens at dictionary lookup time,
/// not in the position-mapped normalized sequence.
pub fn normalize(input: &str) -> KiwiDictionaryResult<Normalized> {
    let mut chars = Vec::with_capacity(input.len());
    let mut pos_map = Vec::with_capacity(input.len());
    let mut utf16_pos: u32 = 0;

    for c in input.chars() {
        match split_syllable(c) {
            Some((base, coda)) => {
                chars.push(base);
                pos_map.push(utf16_pos);
                chars.push(coda);
                pos_map.push(utf16_pos);
            }
            None => {
                chars.push(c);
                pos_map.push(utf16_pos);
            }
        }
        utf16_pos += utf16_len(c);
    }

    Ok(Normalized { chars, pos_map })
}

/// Normalizes a UTF-16 code unit buffer, surfacing unpaired surrogates as
/// `InvalidUnicode` rather than substituting a replacement character.
pub fn normalize_utf16(input: &[u16]) -> KiwiDictionaryResult<Normalized> {
    let mut chars = Vec::with_capacity(input.len());
    let mut pos_map = Vec::with_capacity(input.len());
    let mut utf16_pos: u32 = 0;

    for unit in char::decode_utf16(input.iter().copied()) {
        let c = unit.map_err(|err| {
            KiwiDictionaryErrorKind::InvalidUnicode
                .with_error(anyhow::anyhow!("unpaired surrogate: {:?}", err))
        })?;
        match split_syllable(c) {
            Some((base, coda)) => {
                chars.push(base);
                pos_map.push(utf16_pos);
                chars.push(coda);
                pos_map.push(utf16_pos);
            }
            None => {
                chars.push(c);
                pos_map.push(utf16_pos);
            }
        }
        utf16_pos += utf16_len(c);
    }

    Ok(Normalized { chars, pos_map })
}

/// The inverse of [`normalize`]: recomposes coda-less-syllable + coda-jamo
/// pairs back into precomposed syllables.
pub fn join(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if i + 1 < chars.len() {
            if let Some(joined) = join_coda(chars[i], chars[i + 1]) {
                out.push(joined);
                i += 2;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Collapses any run of Unicode whitespace to a single ASCII space, for use
/// as a dictionary lookup key. The caller's position map is unaffected —
/// this produces a separate string used only for form-automaton matching.
pub fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_syllables_with_and_without_coda() {
        for s in ["학교에서도", "먹었다", "사겼다", "ㅋㅋㅋ", "hello 세계"] {
            let normalized = normalize(s).unwrap();
            assert_eq!(join(&normalized.chars), s);
        }
    }

    #[test]
    fn position_map_is_monotone_non_decreasing() {
        let normalized = normalize("학교에서도 hello").unwrap();
        for w in normalized.pos_map.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn splits_coda_into_base_plus_jamo() {
        let normalized = normalize("학").unwrap();
        // 학 = 하 + coda ㄱ
        assert_eq!(normalized.chars.len(), 2);
        assert_eq!(normalized.chars[0], '하');
        assert_eq!(normalized.chars[1] as u32, 0x11A8);
    }

    #[test]
    fn passes_through_syllable_without_coda() {
        let normalized = normalize("가").unwrap();
        assert_eq!(normalized.chars, vec!['가']);
    }

    #[test]
    fn empty_input_normalizes_to_empty() {
        let normalized = normalize("").unwrap();
        assert!(normalized.is_empty());
    }

    #[test]
    fn rejects_unpaired_surrogate() {
        let bad: Vec<u16> = vec![0xD800, 0x0041]; // high surrogate not followed by low
        assert!(normalize_utf16(&bad).is_err());
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(collapse_whitespace("a   b\t\tc"), "a b c");
    }
}
