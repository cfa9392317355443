//! Per-call match options and analyzer construction options.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Bitwise-OR'd per-analysis options.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MatchOptions: u32 {
        const URL              = 1 << 0;
        const EMAIL            = 1 << 1;
        const HASHTAG          = 1 << 2;
        const MENTION          = 1 << 3;
        const SERIAL           = 1 << 4;
        const NORMALIZE_CODA   = 1 << 5;
        const JOIN_NOUN_PREFIX = 1 << 6;
        const JOIN_NOUN_SUFFIX = 1 << 7;
        const JOIN_VERB_SUFFIX = 1 << 8;
        const JOIN_ADJ_SUFFIX  = 1 << 9;
        const JOIN_ADV_SUFFIX  = 1 << 10;
        const SPLIT_COMPLEX    = 1 << 11;
        const Z_CODA           = 1 << 12;
        const COMPATIBLE_JAMO  = 1 << 13;
        const SPLIT_SAISIOT    = 1 << 14;
        const MERGE_SAISIOT    = 1 << 15;
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions::URL
            | MatchOptions::EMAIL
            | MatchOptions::HASHTAG
            | MatchOptions::MENTION
            | MatchOptions::SERIAL
            | MatchOptions::Z_CODA
    }
}

bitflags! {
    /// Bitmask over allowed regional dialects (`enabled_dialects`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Dialects: u32 {
        const STANDARD    = 1 << 0;
        const GYEONGGI    = 1 << 1;
        const CHUNGCHEONG = 1 << 2;
        const GYEONGSANG  = 1 << 3;
        const JEOLLA      = 1 << 4;
        const JEJU        = 1 << 5;
    }
}

impl Default for Dialects {
    fn default() -> Self {
        Dialects::STANDARD
    }
}

/// `model_type` construction option; mirrors
/// `kiwi_dictionary::metadata::LmModelType` one-to-one, kept as a
/// separate type at this layer since it's a user-facing construction
/// knob rather than a stored-model fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Knlm,
    Sbg,
    Cong,
    CongGlobal,
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::Knlm
    }
}

/// A caller-pinned analysis for one byte range of the *normalized* input.
#[derive(Debug, Clone)]
pub struct PinnedSpan {
    pub start: usize,
    pub end: usize,
    pub morphemes: Vec<kiwi_dictionary::MorphemeId>,
}

/// Per-call search parameters, passed to `Analyzer::analyze`.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest<'a> {
    pub text: &'a str,
    pub top_n: usize,
    pub match_options: MatchOptions,
    pub blocklist: &'a [kiwi_dictionary::MorphemeId],
    pub pinned_spans: &'a [PinnedSpan],
    pub allowed_dialects: Dialects,
    pub dialect_cost: f32,
}

impl<'a> AnalyzeRequest<'a> {
    pub fn new(text: &'a str) -> Self {
        AnalyzeRequest {
            text,
            top_n: 1,
            match_options: MatchOptions::default(),
            blocklist: &[],
            pinned_spans: &[],
            allowed_dialects: Dialects::default(),
            dialect_cost: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_options_compose_with_bitwise_or() {
        let opts = MatchOptions::URL | MatchOptions::EMAIL;
        assert!(opts.contains(MatchOptions::URL));
        assert!(opts.contains(MatchOptions::EMAIL));
        assert!(!opts.contains(MatchOptions::HASHTAG));
    }
}
