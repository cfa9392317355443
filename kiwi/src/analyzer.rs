//! Public facade: `Analyzer`/`AnalyzerBuilder`, orchestrating
//! normalization → lattice construction → beam search per call, and
//! assembling the resulting `Token` sequence.

use std::path::Path;

use kiwi_dictionary::dictionary::Dictionary;
use kiwi_dictionary::hangul::Normalized;
use kiwi_dictionary::pos::PosTag;
use serde::{Deserialize, Serialize};

use crate::error::{KiwiError, KiwiErrorKind, KiwiResult};
use crate::lattice::Lattice;
use crate::options::{AnalyzeRequest, Dialects, MatchOptions, ModelType, PinnedSpan};
use crate::search::{search, HypEntryPublic};
use crate::sentence;
use crate::token::{AnalysisResult, Token};

/// Construction-time knobs, deserializable from JSON via
/// `serde_json::from_reader`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub model_type: ModelType,
    /// When true, a token's reported tag/sense/morpheme ID are taken from
    /// its allomorph group's canonical member (`group_id`) rather than the
    /// specific allomorph actually matched.
    pub integrate_allomorph: bool,
    pub enabled_dialects: Dialects,
    /// Every re-split sub-sentence is capped to this many UTF-16 units.
    pub max_sentence_len: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            model_type: ModelType::default(),
            integrate_allomorph: true,
            enabled_dialects: Dialects::default(),
            max_sentence_len: 200,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_json(json: &str) -> KiwiResult<Self> {
        serde_json::from_str(json)
            .map_err(|err| KiwiErrorKind::Format.with_error(anyhow::anyhow!(err)))
    }
}

pub struct AnalyzerBuilder {
    config: AnalyzerConfig,
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        AnalyzerBuilder {
            config: AnalyzerConfig::default(),
        }
    }

    pub fn config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self, dict_path: &Path) -> KiwiResult<Analyzer> {
        log::debug!("loading dictionary from {dict_path:?}");
        let dict = Dictionary::load_from_path(dict_path).map_err(KiwiError::from)?;
        Ok(Analyzer {
            dict,
            config: self.config,
        })
    }

    pub fn build_from_dictionary(self, dict: Dictionary) -> Analyzer {
        Analyzer {
            dict,
            config: self.config,
        }
    }
}

pub struct Analyzer {
    dict: Dictionary,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// Splits `request.text` into sentences (re-splitting any single
    /// sentence that exceeds `max_sentence_len` at a safe boundary),
    /// normalizes, then runs an independent lattice + beam search per
    /// sentence and concatenates same-rank results. A text with no
    /// sentence break and under the length cap takes a single pass, same
    /// as before per-sentence splitting existed.
    pub fn analyze<'a>(&self, request: &AnalyzeRequest<'a>) -> KiwiResult<Vec<AnalysisResult<'a>>> {
        let normalized = kiwi_dictionary::hangul::normalize(request.text).map_err(KiwiError::from)?;
        let total_utf16_len = request.text.encode_utf16().count() as u32;
        let (char_start, char_end) = position_map(&normalized, total_utf16_len);
        let normalized_text: String = normalized.chars.iter().collect();
        let byte_to_char_idx = byte_to_char_index(&normalized_text);
        let utf16_to_byte = utf16_to_byte_map(request.text);

        let sentence_ranges = sentence::split_sentences(request.text, self.config.max_sentence_len);
        if sentence_ranges.len() <= 1 {
            return self.analyze_normalized(
                request,
                &normalized_text,
                0..normalized_text.len(),
                0,
                &char_start,
                &char_end,
                &byte_to_char_idx,
                &utf16_to_byte,
            );
        }

        log::debug!("split input into {} sentences", sentence_ranges.len());
        let norm_byte_offsets = char_byte_offsets(&normalized_text);
        let mut per_sentence = Vec::with_capacity(sentence_ranges.len());
        for (idx, range) in sentence_ranges.iter().enumerate() {
            let char_range = original_range_to_normalized_chars(request.text, range, &char_start);
            let norm_range = norm_byte_offsets[char_range.start]..norm_byte_offsets[char_range.end];
            per_sentence.push(self.analyze_normalized(
                request,
                &normalized_text,
                norm_range,
                idx as u32,
                &char_start,
                &char_end,
                &byte_to_char_idx,
                &utf16_to_byte,
            )?);
        }

        let top_n = request.top_n.max(1);
        let mut combined = Vec::with_capacity(top_n);
        for rank in 0..top_n {
            let mut tokens = Vec::new();
            let mut score = 0.0f32;
            for results in &per_sentence {
                if let Some(r) = results.get(rank).or_else(|| results.last()) {
                    tokens.extend(r.tokens.iter().cloned());
                    score += r.score;
                }
            }
            combined.push(AnalysisResult { tokens, score });
        }
        Ok(combined)
    }

    /// Runs normalize-buffer-relative lattice + search over one sentence's
    /// byte range of the already-normalized text, offsetting everything
    /// back onto the shared `char_start`/`byte_to_char_idx` tables (built
    /// once over the whole input) so token positions land on the right
    /// spot in the original text regardless of which sentence produced
    /// them.
    #[allow(clippy::too_many_arguments)]
    fn analyze_normalized<'a>(
        &self,
        request: &AnalyzeRequest<'a>,
        normalized_text: &str,
        norm_range: std::ops::Range<usize>,
        sub_sent_index: u32,
        char_start: &[u32],
        char_end: &[u32],
        byte_to_char_idx: &[usize],
        utf16_to_byte: &[(u32, usize)],
    ) -> KiwiResult<Vec<AnalysisResult<'a>>> {
        let slice = normalized_text[norm_range.clone()].to_string();
        let sub_pinned: Vec<PinnedSpan> = request
            .pinned_spans
            .iter()
            .filter(|p| p.start >= norm_range.start && p.end <= norm_range.end)
            .map(|p| PinnedSpan {
                start: p.start - norm_range.start,
                end: p.end - norm_range.start,
                morphemes: p.morphemes.clone(),
            })
            .collect();

        let lattice = Lattice::build(&self.dict, slice, request.match_options, &sub_pinned);
        let result = search(&self.dict, &lattice, request);

        let mut outputs = Vec::with_capacity(result.paths.len());
        for &(tail_idx, score) in &result.paths {
            let mut tokens = self.backtrace(
                &result.arena,
                tail_idx,
                &lattice,
                norm_range.start,
                char_start,
                char_end,
                byte_to_char_idx,
                utf16_to_byte,
                request.text,
                request.allowed_dialects,
            );
            for token in &mut tokens {
                token.sub_sent_position = sub_sent_index;
            }
            let mut tokens = apply_joins(tokens, request.match_options);
            resolve_paired_brackets(&mut tokens);
            outputs.push(AnalysisResult { tokens, score });
        }
        Ok(outputs)
    }

    #[allow(clippy::too_many_arguments)]
    fn backtrace<'a>(
        &self,
        arena: &[HypEntryPublic],
        tail_idx: usize,
        lattice: &Lattice,
        byte_offset: usize,
        char_start: &[u32],
        char_end: &[u32],
        byte_to_char_idx: &[usize],
        utf16_to_byte: &[(u32, usize)],
        original_text: &'a str,
        allowed_dialects: Dialects,
    ) -> Vec<Token<'a>> {
        let start_node = lattice.start_node();
        let end_node = lattice.end_node();
        let mut chain = Vec::new();
        let mut idx = tail_idx;
        loop {
            let entry = arena[idx];
            if entry.node != start_node && entry.node != end_node {
                chain.push(entry);
            }
            match entry.prev {
                Some(p) => idx = p,
                None => break,
            }
        }
        chain.reverse();

        let mut prev_score = 0.0f32;
        let mut tokens = Vec::new();
        for entry in &chain {
            let node = &lattice.nodes[entry.node];
            let morpheme = self.dict.morpheme(entry.morpheme);
            let token_score = entry.score - prev_score;
            prev_score = entry.score;

            // A chunked (pre-analyzed) morpheme surfaces as one token per
            // chunk, not one token for the whole compound span — e.g. a
            // pre-analyzed "사겼다" yields 사귀/VV, 었/EP, 다/EF rather than
            // one 사겼다/VV token. Chunk byte offsets are relative to the
            // node's own matched span in the normalized buffer.
            if let Some(chunks) = &morpheme.chunks {
                let per_chunk_score = token_score / chunks.len().max(1) as f32;
                for chunk in chunks {
                    let abs_start = byte_offset + node.start + chunk.byte_start as usize;
                    let abs_end = byte_offset + node.start + chunk.byte_end as usize;
                    tokens.push(self.emit_token(
                        chunk.morpheme,
                        abs_start,
                        abs_end,
                        node.typo_cost,
                        per_chunk_score,
                        char_start,
                        char_end,
                        byte_to_char_idx,
                        utf16_to_byte,
                        original_text,
                        allowed_dialects,
                    ));
                }
            } else {
                tokens.push(self.emit_token(
                    entry.morpheme,
                    byte_offset + node.start,
                    byte_offset + node.end,
                    node.typo_cost,
                    token_score,
                    char_start,
                    char_end,
                    byte_to_char_idx,
                    utf16_to_byte,
                    original_text,
                    allowed_dialects,
                ));
            }
        }
        tokens
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_token<'a>(
        &self,
        morph_id: kiwi_dictionary::MorphemeId,
        byte_start_norm: usize,
        byte_end_norm: usize,
        typo_cost: u16,
        score: f32,
        char_start: &[u32],
        char_end: &[u32],
        byte_to_char_idx: &[usize],
        utf16_to_byte: &[(u32, usize)],
        original_text: &'a str,
        allowed_dialects: Dialects,
    ) -> Token<'a> {
        let reported_id = if self.config.integrate_allomorph {
            self.dict.canonical_morpheme(morph_id)
        } else {
            morph_id
        };
        let morpheme = self.dict.morpheme(reported_id);
        let form = self.dict.form(morpheme.surface_form);

        let first_char = byte_to_char_idx[byte_start_norm];
        let last_char_exclusive = byte_to_char_idx[byte_end_norm];
        let utf16_start = char_start[first_char];
        let utf16_end = if last_char_exclusive > first_char {
            char_end[last_char_exclusive - 1]
        } else {
            utf16_start
        };

        let byte_start = byte_offset_at(utf16_to_byte, utf16_start);
        let byte_end = byte_offset_at(utf16_to_byte, utf16_end);
        let surface = if byte_end > byte_start && byte_end <= original_text.len() {
            std::borrow::Cow::Borrowed(&original_text[byte_start..byte_end])
        } else {
            std::borrow::Cow::Owned(form.normalized.clone())
        };

        let dialect = if morpheme.dialect_bits != 0 {
            Dialects::from_bits_truncate(morpheme.dialect_bits) & allowed_dialects
        } else {
            Dialects::STANDARD
        };

        Token {
            surface,
            tag: morpheme.tag,
            sense_id: morpheme.sense_id,
            start_pos: utf16_start,
            length: utf16_end.saturating_sub(utf16_start),
            score,
            typo_cost,
            paired_bracket: None,
            sub_sent_position: 0,
            dialect,
            morpheme: reported_id,
        }
    }
}

/// Groups consecutive normalized chars sharing one `pos_map` entry (a
/// coda split from one original syllable) and assigns each the original
/// character's full UTF-16 start/end span.
fn position_map(normalized: &Normalized, total_utf16_len: u32) -> (Vec<u32>, Vec<u32>) {
    let n = normalized.chars.len();
    let mut starts = vec![0u32; n];
    let mut ends = vec![0u32; n];
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && normalized.pos_map[j] == normalized.pos_map[i] {
            j += 1;
        }
        let end = if j < n { normalized.pos_map[j] } else { total_utf16_len };
        for slot in starts.iter_mut().take(j).skip(i) {
            *slot = normalized.pos_map[i];
        }
        for slot in ends.iter_mut().take(j).skip(i) {
            *slot = end;
        }
        i = j;
    }
    (starts, ends)
}

fn byte_to_char_index(text: &str) -> Vec<usize> {
    let mut map = vec![0usize; text.len() + 1];
    let mut char_idx = 0;
    for (byte_off, _) in text.char_indices() {
        map[byte_off] = char_idx;
        char_idx += 1;
    }
    map[text.len()] = char_idx;
    map
}

fn utf16_to_byte_map(text: &str) -> Vec<(u32, usize)> {
    let mut map = Vec::new();
    let mut utf16_pos = 0u32;
    for (byte_idx, c) in text.char_indices() {
        map.push((utf16_pos, byte_idx));
        utf16_pos += c.len_utf16() as u32;
    }
    map.push((utf16_pos, text.len()));
    map
}

fn byte_offset_at(map: &[(u32, usize)], utf16_pos: u32) -> usize {
    match map.binary_search_by_key(&utf16_pos, |&(u, _)| u) {
        Ok(i) => map[i].1,
        Err(i) => map.get(i).map(|&(_, b)| b).unwrap_or(map[map.len() - 1].1),
    }
}

/// Byte offset of each char in `text`, plus a trailing `text.len()`
/// sentinel, so a normalized-char index range can be turned into a byte
/// range in one lookup.
fn char_byte_offsets(text: &str) -> Vec<usize> {
    let mut offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
    offsets.push(text.len());
    offsets
}

/// Maps a byte range of the *original* text to the matching index range
/// in the normalized-char tables built by `position_map`. Sentence splits
/// always land on original-character boundaries, so the UTF-16 offsets at
/// `range`'s ends always coincide with a `char_start` group boundary.
fn original_range_to_normalized_chars(
    original_text: &str,
    range: &std::ops::Range<usize>,
    char_start: &[u32],
) -> std::ops::Range<usize> {
    let utf16_start = original_text[..range.start].encode_utf16().count() as u32;
    let utf16_end = original_text[..range.end].encode_utf16().count() as u32;
    let start_idx = char_start.partition_point(|&s| s < utf16_start);
    let end_idx = char_start.partition_point(|&s| s < utf16_end);
    start_idx..end_idx
}

/// Given two adjacent tokens' tags, returns the tag the merged token
/// should carry, if any `JOIN_*` option sanctions merging them.
/// `next_surface` is needed to tell the -히/-이 adverbializer apart from
/// the rest of `Xsa`.
fn join_rule(prev: PosTag, next: PosTag, options: MatchOptions, next_surface: &str) -> Option<PosTag> {
    use PosTag::*;
    match (prev, next) {
        (Xpn, Nng | Nnp | Nnb) if options.contains(MatchOptions::JOIN_NOUN_PREFIX) => Some(next),
        (Nng | Nnp | Nnb | Nr, Xsn) if options.contains(MatchOptions::JOIN_NOUN_SUFFIX) => Some(Nng),
        (Nng | Nnp | Xr, Xsv) if options.contains(MatchOptions::JOIN_VERB_SUFFIX) => Some(Vv),
        (Nng | Nnp | Xr, Xsa) if options.contains(MatchOptions::JOIN_ADV_SUFFIX) && matches!(next_surface, "히" | "이") => {
            Some(Mag)
        }
        (Nng | Nnp | Xr, Xsa) if options.contains(MatchOptions::JOIN_ADJ_SUFFIX) => Some(Va),
        _ => None,
    }
}

/// Merges adjacent tokens sanctioned by `join_rule` into a single token
/// (concatenated surface, combined tag, summed score), run after
/// backtrace and before bracket pairing so pairing indices reflect the
/// merged token count. Runs to a fixed point so e.g. `Xpn`+`Nng`+`Xsn`
/// collapses across two merges.
fn apply_joins(tokens: Vec<Token>, options: MatchOptions) -> Vec<Token> {
    if options.is_empty() {
        return tokens;
    }
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(prev) = out.last_mut() {
            let adjacent = prev.start_pos + prev.length == token.start_pos;
            if adjacent {
                if let Some(tag) = join_rule(prev.tag, token.tag, options, &token.surface) {
                    let mut surface = String::with_capacity(prev.surface.len() + token.surface.len());
                    surface.push_str(&prev.surface);
                    surface.push_str(&token.surface);
                    prev.surface = std::borrow::Cow::Owned(surface);
                    prev.tag = tag;
                    prev.length += token.length;
                    prev.score += token.score;
                    prev.typo_cost += token.typo_cost;
                    continue;
                }
            }
        }
        out.push(token);
    }
    out
}

fn opening_to_closing(c: char) -> Option<char> {
    match c {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '"' => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}

/// Resolves bracket/quote pairing among `SS`-tagged tokens with a simple
/// stack, matching same-sentence nesting only.
fn resolve_paired_brackets(tokens: &mut [Token]) {
    let mut stack: Vec<(usize, char)> = Vec::new();
    for i in 0..tokens.len() {
        if tokens[i].tag != PosTag::Ss {
            continue;
        }
        let c = match tokens[i].surface.chars().next() {
            Some(c) => c,
            None => continue,
        };
        if let Some(closing) = opening_to_closing(c) {
            stack.push((i, closing));
        } else if let Some(&(open_idx, expected)) = stack.last() {
            if c == expected {
                stack.pop();
                tokens[open_idx].paired_bracket = Some(i as u32);
                tokens[i].paired_bracket = Some(open_idx as u32);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_json() {
        let config = AnalyzerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = AnalyzerConfig::from_json(&json).unwrap();
        assert_eq!(parsed.max_sentence_len, config.max_sentence_len);
    }

    fn stub_token(tag: PosTag, surface: &str, start_pos: u32) -> Token<'static> {
        Token {
            surface: std::borrow::Cow::Owned(surface.to_string()),
            tag,
            sense_id: 0,
            start_pos,
            length: surface.chars().count() as u32,
            score: 1.0,
            typo_cost: 0,
            paired_bracket: None,
            sub_sent_position: 0,
            dialect: Dialects::STANDARD,
            morpheme: kiwi_dictionary::MorphemeId(0),
        }
    }

    #[test]
    fn join_noun_suffix_merges_noun_and_suffix_into_one_noun_token() {
        let tokens = vec![stub_token(PosTag::Nng, "회사", 0), stub_token(PosTag::Xsn, "원", 2)];
        let joined = apply_joins(tokens, MatchOptions::JOIN_NOUN_SUFFIX);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].surface.as_ref(), "회사원");
        assert_eq!(joined[0].tag, PosTag::Nng);
        assert_eq!(joined[0].length, 3);
    }

    #[test]
    fn join_is_skipped_without_the_matching_option() {
        let tokens = vec![stub_token(PosTag::Nng, "회사", 0), stub_token(PosTag::Xsn, "원", 2)];
        let joined = apply_joins(tokens, MatchOptions::empty());
        assert_eq!(joined.len(), 2);
    }

    #[test]
    fn join_adv_suffix_prefers_hi_i_surface_over_adj_suffix() {
        let tokens = vec![stub_token(PosTag::Nng, "조용", 0), stub_token(PosTag::Xsa, "히", 2)];
        let joined = apply_joins(
            tokens,
            MatchOptions::JOIN_ADV_SUFFIX | MatchOptions::JOIN_ADJ_SUFFIX,
        );
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].tag, PosTag::Mag);
    }

    #[test]
    fn position_map_groups_coda_split_pair() {
        let normalized = kiwi_dictionary::hangul::normalize("학교").unwrap();
        let (starts, ends) = position_map(&normalized, 2);
        // 학 splits into 하 + coda jamo, both sharing utf16 offset 0, spanning to 1.
        assert_eq!(starts[0], 0);
        assert_eq!(ends[0], 1);
        assert_eq!(starts[1], 0);
        assert_eq!(ends[1], 1);
    }
}
