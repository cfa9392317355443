//! Form automaton — a double-array Aho-Corasick trie over every known
//! form, used to enumerate all dictionary matches in a single
//! left-to-right pass over the normalized input.
//!
//! `daachorse::DoubleArrayAhoCorasick` already maintains failure links and
//! `find_overlapping_iter` already walks them to report every pattern
//! ending at every position, which is exactly the submatch harvesting
//! this crate needs — this module is the thin layer that maps
//! daachorse's pattern values back to dictionary forms and typo-variant
//! metadata.

use daachorse::DoubleArrayAhoCorasickBuilder;

use crate::error::{KiwiDictionaryErrorKind, KiwiDictionaryResult};
use crate::form::FormId;
use crate::morpheme::VowelConstraint;

/// One candidate origin for a trie path. Exact-mode entries have
/// `typo_cost == 0`; typo-expanded entries carry the substitution cost and
/// an optional constraint on the vowel class to the left of the match
/// (some typo rules are only valid after a particular vowel class).
#[derive(Debug, Clone)]
pub struct AutomatonEntry {
    pub form_id: FormId,
    pub typo_cost: u16,
    pub left_vowel_condition: Option<VowelConstraint>,
}

impl AutomatonEntry {
    pub fn exact(form_id: FormId) -> Self {
        AutomatonEntry {
            form_id,
            typo_cost: 0,
            left_vowel_condition: None,
        }
    }
}

pub struct FormAutomaton {
    da: daachorse::DoubleArrayAhoCorasick<u32>,
    /// Indexed by the pattern value daachorse hands back from a match;
    /// each slot holds every candidate origin sharing that surface string.
    entries: Vec<Vec<AutomatonEntry>>,
}

pub struct AutomatonMatch<'a> {
    pub start: usize,
    pub end: usize,
    pub entries: &'a [AutomatonEntry],
}

impl FormAutomaton {
    /// Builds the automaton from `(normalized_surface, origins)` pairs.
    /// Callers are responsible for merging duplicate surfaces into one
    /// entry list before calling this (the builder in `dictionary.rs` does
    /// this via a sorted map so duplicate surfaces share one trie path).
    pub fn build(patterns: Vec<(String, Vec<AutomatonEntry>)>) -> KiwiDictionaryResult<Self> {
        let mut entries = Vec::with_capacity(patterns.len());
        let mut keyed = Vec::with_capacity(patterns.len());
        for (idx, (surface, origins)) in patterns.into_iter().enumerate() {
            keyed.push((surface, idx as u32));
            entries.push(origins);
        }

        let da = DoubleArrayAhoCorasickBuilder::new()
            .build_with_values(keyed)
            .map_err(|err| {
                KiwiDictionaryErrorKind::Format.with_error(anyhow::anyhow!(err.to_string()))
            })?;

        Ok(FormAutomaton { da, entries })
    }

    /// Enumerates every dictionary hit in `text` in a single left-to-right
    /// pass, in daachorse's natural (end-position-ascending) order.
    pub fn traverse<'a>(&'a self, text: &'a str) -> impl Iterator<Item = AutomatonMatch<'a>> + 'a {
        self.da.find_overlapping_iter(text).map(move |m| {
            let idx = m.value() as usize;
            AutomatonMatch {
                start: m.start(),
                end: m.end(),
                entries: &self.entries[idx],
            }
        })
    }

    /// Exact-surface lookup (no submatch harvesting): every origin whose
    /// surface equals `text` exactly.
    pub fn find_surface<'a>(&'a self, text: &'a str) -> &'a [AutomatonEntry] {
        for m in self.da.find_overlapping_iter(text) {
            if m.start() == 0 && m.end() == text.len() {
                return &self.entries[m.value() as usize];
            }
        }
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_sample() -> FormAutomaton {
        FormAutomaton::build(vec![
            ("학교".to_string(), vec![AutomatonEntry::exact(FormId(0))]),
            ("에서".to_string(), vec![AutomatonEntry::exact(FormId(1))]),
            ("도".to_string(), vec![AutomatonEntry::exact(FormId(2))]),
            ("교".to_string(), vec![AutomatonEntry::exact(FormId(3))]),
        ])
        .unwrap()
    }

    #[test]
    fn finds_every_overlapping_hit_in_one_pass() {
        let automaton = build_sample();
        let hits: Vec<_> = automaton
            .traverse("학교에서도")
            .map(|m| (m.start, m.end))
            .collect();
        // "학교" (0..6 bytes), "교" submatch (3..6), "에서" (6..12), "도" (12..15)
        assert!(hits.contains(&(0, 6)));
        assert!(hits.contains(&(3, 6)));
        assert!(hits.contains(&(6, 12)));
        assert!(hits.contains(&(12, 15)));
    }

    #[test]
    fn find_surface_requires_exact_bounds() {
        let automaton = build_sample();
        assert_eq!(automaton.find_surface("학교").len(), 1);
        assert_eq!(automaton.find_surface("학교에서도").len(), 0);
    }

    #[test]
    fn duplicate_surfaces_share_one_path_with_multiple_origins() {
        let automaton = FormAutomaton::build(vec![(
            "말".to_string(),
            vec![
                AutomatonEntry::exact(FormId(0)),
                AutomatonEntry::exact(FormId(1)),
            ],
        )])
        .unwrap();
        assert_eq!(automaton.find_surface("말").len(), 2);
    }
}
