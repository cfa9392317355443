//! Lattice construction: builds a DAG of candidate form-occurrences
//! over the normalized input. Nodes live in a flat arena indexed both
//! by start and end byte position so the beam search in `crate::search`
//! can walk forward from either side.

use std::collections::HashSet;

use kiwi_dictionary::character_definition::CharCategory;
use kiwi_dictionary::dictionary::Dictionary;
use kiwi_dictionary::morpheme::MorphemeId;
use kiwi_dictionary::pos::PosTag;

use crate::options::{MatchOptions, PinnedSpan};

/// Jongseong (coda jamo) Unicode block, produced by splitting every
/// closed-syllable precomposed Hangul character during normalization.
const CODA_RANGE: std::ops::RangeInclusive<u32> = 0x11A8..=0x11C2;
/// The sai-siot (connecting ㅅ) coda specifically.
const SIOT_CODA: u32 = 0x11BA;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Sentinel,
    Known,
    Pattern(PosTag),
    Unknown(CharCategory),
    Pinned,
}

#[derive(Debug, Clone)]
pub struct LatticeNode {
    pub start: usize,
    pub end: usize,
    pub kind: NodeKind,
    pub morphemes: Vec<MorphemeId>,
    pub typo_cost: u16,
    /// For unknown-form nodes, the LM token to query instead of
    /// `Morpheme::lm_morpheme_id` (unknown runs share a handful of
    /// per-category tokens, not one-per-morpheme-table-entry tokens).
    pub lm_token_override: Option<u32>,
}

/// A DAG over byte offsets into `normalized_text`, bounded by sentinel
/// start (offset 0) and end (offset `len`) nodes.
pub struct Lattice {
    pub normalized_text: String,
    pub len: usize,
    pub nodes: Vec<LatticeNode>,
    pub starting_at: Vec<Vec<NodeId>>,
    pub ending_at: Vec<Vec<NodeId>>,
}

/// `build()` always pushes the start sentinel first and the end sentinel
/// second, and `prune_unreachable` never removes either (both lie on
/// every complete path by definition) or reorders anything before them,
/// so their IDs are stable constants rather than derived lookups — which
/// matters for the empty-input case, where both sentinels sit at
/// position 0 and a `starting_at`/`ending_at` lookup can't tell them
/// apart.
const START_ID: NodeId = 0;
const END_ID: NodeId = 1;

impl Lattice {
    pub fn start_node(&self) -> NodeId {
        START_ID
    }

    pub fn end_node(&self) -> NodeId {
        END_ID
    }

    /// Whether a node ending at `a_end` may be directly followed by a node
    /// starting at `b_start`: the gap between them must be entirely
    /// whitespace (possibly empty). Returns the whitespace count on hit.
    pub fn gap(&self, a_end: usize, b_start: usize) -> Option<usize> {
        if b_start < a_end {
            return None;
        }
        let slice = &self.normalized_text[a_end..b_start];
        if slice.chars().all(|c| c.is_whitespace()) {
            Some(slice.chars().count())
        } else {
            None
        }
    }

    pub fn build(
        dict: &Dictionary,
        normalized_text: String,
        options: MatchOptions,
        pinned_spans: &[PinnedSpan],
    ) -> Lattice {
        let len = normalized_text.len();
        let mut nodes: Vec<LatticeNode> = Vec::new();
        let mut starting_at: Vec<Vec<NodeId>> = vec![Vec::new(); len + 1];
        let mut ending_at: Vec<Vec<NodeId>> = vec![Vec::new(); len + 1];

        macro_rules! push {
            ($node:expr) => {{
                let node: LatticeNode = $node;
                let id = nodes.len();
                starting_at[node.start].push(id);
                ending_at[node.end].push(id);
                nodes.push(node);
            }};
        }

        push!(LatticeNode {
            start: 0,
            end: 0,
            kind: NodeKind::Sentinel,
            morphemes: Vec::new(),
            typo_cost: 0,
            lm_token_override: None,
        });
        push!(LatticeNode {
            start: len,
            end: len,
            kind: NodeKind::Sentinel,
            morphemes: Vec::new(),
            typo_cost: 0,
            lm_token_override: None,
        });

        let mut covered = vec![false; len];
        let mark_covered = |covered: &mut Vec<bool>, start: usize, end: usize| {
            for slot in covered.iter_mut().take(end).skip(start) {
                *slot = true;
            }
        };

        for span in pinned_spans {
            push!(LatticeNode {
                start: span.start,
                end: span.end,
                kind: NodeKind::Pinned,
                morphemes: span.morphemes.clone(),
                typo_cost: 0,
                lm_token_override: None,
            });
            mark_covered(&mut covered, span.start, span.end);
        }

        let overlaps_pinned =
            |start: usize, end: usize| pinned_spans.iter().any(|s| start < s.end && end > s.start);

        // Step 1: form automaton, one node per candidate origin per hit
        // (duplicate surfaces share a trie path but keep distinct origins).
        let mut known_nodes: Vec<LatticeNode> = Vec::new();
        for m in dict.automaton().traverse(&normalized_text) {
            if overlaps_pinned(m.start, m.end) {
                continue;
            }
            for entry in m.entries {
                let candidates = dict.form(entry.form_id).candidates.clone();
                if candidates.is_empty() {
                    continue;
                }
                known_nodes.push(LatticeNode {
                    start: m.start,
                    end: m.end,
                    kind: NodeKind::Known,
                    morphemes: candidates,
                    typo_cost: entry.typo_cost,
                    lm_token_override: None,
                });
            }
        }

        // A compound already covered by two or more shorter adjacent
        // entries is dropped in favor of the decomposed reading.
        if options.contains(MatchOptions::SPLIT_COMPLEX) {
            let spans: HashSet<(usize, usize)> = known_nodes.iter().map(|n| (n.start, n.end)).collect();
            known_nodes.retain(|n| {
                !(n.start + 1..n.end).any(|mid| spans.contains(&(n.start, mid)) && spans.contains(&(mid, n.end)))
            });
        }

        // Optional coda absorption: a matched form may stretch one coda
        // jamo further than its plain dictionary span, under three
        // distinct triggers sharing the same "extend by the next coda
        // char" shape.
        let mut extra_nodes: Vec<LatticeNode> = Vec::new();
        for node in &known_nodes {
            let Some(c) = normalized_text[node.end..].chars().next() else {
                continue;
            };
            let code = c as u32;
            if !CODA_RANGE.contains(&code) {
                continue;
            }
            let z_coda_form = node
                .morphemes
                .iter()
                .any(|&m| dict.form(dict.morpheme(m).surface_form).z_coda_appendable);
            let siot_form = node
                .morphemes
                .iter()
                .any(|&m| dict.form(dict.morpheme(m).surface_form).z_siot_appendable);

            if options.contains(MatchOptions::Z_CODA) && z_coda_form {
                extra_nodes.push(extend_node(node, c));
            }
            if options.contains(MatchOptions::MERGE_SAISIOT) && code == SIOT_CODA && siot_form {
                extra_nodes.push(extend_node(node, c));
            }
            if options.contains(MatchOptions::NORMALIZE_CODA) {
                let after = normalized_text[node.end + c.len_utf8()..].chars().next();
                if after.map(|a| a.is_whitespace()).unwrap_or(true) {
                    extra_nodes.push(extend_node(node, c));
                }
            }
        }
        known_nodes.extend(extra_nodes);

        // A form eligible for sai-siot attachment may also match one coda
        // jamo short of its full span, leaving the ㅅ itself to the next
        // word's juncture.
        if options.contains(MatchOptions::SPLIT_SAISIOT) {
            let mut split_nodes = Vec::new();
            for node in &known_nodes {
                let last = normalized_text[node.start..node.end].char_indices().last();
                let Some((rel_off, c)) = last else { continue };
                if c as u32 != SIOT_CODA {
                    continue;
                }
                let siot_form = node
                    .morphemes
                    .iter()
                    .any(|&m| dict.form(dict.morpheme(m).surface_form).z_siot_appendable);
                if siot_form {
                    split_nodes.push(LatticeNode {
                        start: node.start,
                        end: node.start + rel_off,
                        kind: NodeKind::Known,
                        morphemes: node.morphemes.clone(),
                        typo_cost: node.typo_cost + 1,
                        lm_token_override: None,
                    });
                }
            }
            known_nodes.extend(split_nodes);
        }

        for node in known_nodes {
            mark_covered(&mut covered, node.start, node.end);
            push!(node);
        }

        // Step 2: pattern matchers.
        for (start, end, tag) in scan_patterns(&normalized_text, options) {
            if overlaps_pinned(start, end) || covered[start..end].iter().any(|&c| c) {
                continue;
            }
            push!(LatticeNode {
                start,
                end,
                kind: NodeKind::Pattern(tag),
                morphemes: vec![dict.default_morpheme(tag)],
                typo_cost: 0,
                lm_token_override: None,
            });
            mark_covered(&mut covered, start, end);
        }

        // Step 3: unknown-form nodes fill every uncovered, non-whitespace
        // stretch, split into runs per `CharCategory` (bounded length).
        let chars: Vec<(usize, char)> = normalized_text.char_indices().collect();
        let mut i = 0;
        while i < chars.len() {
            let (byte_pos, c) = chars[i];
            if covered[byte_pos] || c.is_whitespace() {
                i += 1;
                continue;
            }
            let category = classify_with_options(c, options);
            let max_len = category.max_run_length();
            let mut j = i;
            let mut run_len = 0usize;
            while j < chars.len() {
                let (bp, cc) = chars[j];
                if covered[bp] || classify_with_options(cc, options) != category || run_len >= max_len {
                    break;
                }
                run_len += 1;
                j += 1;
                if !category.groups_runs() {
                    break;
                }
            }
            let end_byte = if j < chars.len() { chars[j].0 } else { len };
            let unknown_entry = dict.unknown_dictionary.entry_for(category);
            push!(LatticeNode {
                start: byte_pos,
                end: end_byte,
                kind: NodeKind::Unknown(category),
                morphemes: vec![dict.default_morpheme(unknown_entry.tag)],
                typo_cost: 0,
                lm_token_override: Some(unknown_entry.lm_morpheme_id),
            });
            i = j;
        }

        let mut lattice = Lattice {
            normalized_text,
            len,
            nodes,
            starting_at,
            ending_at,
        };
        lattice.prune_unreachable();
        lattice
    }

    /// Removes nodes that lie on no complete start-to-end path.
    fn prune_unreachable(&mut self) {
        let n = self.nodes.len();
        let start = self.start_node();
        let end = self.end_node();

        let mut forward = vec![false; n];
        let mut stack = vec![start];
        forward[start] = true;
        while let Some(node_id) = stack.pop() {
            let node_end = self.nodes[node_id].end;
            for q in node_end..=self.len {
                if self.starting_at[q].is_empty() {
                    continue;
                }
                if self.gap(node_end, q).is_none() {
                    continue;
                }
                for &next in &self.starting_at[q] {
                    if !forward[next] {
                        forward[next] = true;
                        stack.push(next);
                    }
                }
            }
        }

        let mut backward = vec![false; n];
        let mut stack = vec![end];
        backward[end] = true;
        while let Some(node_id) = stack.pop() {
            let node_start = self.nodes[node_id].start;
            for p in (0..=node_start).rev() {
                if self.ending_at[p].is_empty() {
                    continue;
                }
                if self.gap(p, node_start).is_none() {
                    continue;
                }
                for &prev in &self.ending_at[p] {
                    if !backward[prev] {
                        backward[prev] = true;
                        stack.push(prev);
                    }
                }
            }
        }

        let keep: Vec<bool> = (0..n).map(|i| forward[i] && backward[i]).collect();
        if keep.iter().all(|&k| k) {
            return;
        }

        let mut new_nodes = Vec::new();
        for (old_id, node) in self.nodes.iter().enumerate() {
            if keep[old_id] {
                new_nodes.push(node.clone());
            }
        }
        let mut new_starting_at = vec![Vec::new(); self.len + 1];
        let mut new_ending_at = vec![Vec::new(); self.len + 1];
        for (new_id, node) in new_nodes.iter().enumerate() {
            new_starting_at[node.start].push(new_id);
            new_ending_at[node.end].push(new_id);
        }

        self.nodes = new_nodes;
        self.starting_at = new_starting_at;
        self.ending_at = new_ending_at;
    }
}

/// Extends a known node's span to absorb one trailing coda-jamo
/// character `c`, carrying a typo-cost penalty since the dictionary
/// entry itself only covers the shorter span.
fn extend_node(node: &LatticeNode, c: char) -> LatticeNode {
    LatticeNode {
        start: node.start,
        end: node.end + c.len_utf8(),
        kind: NodeKind::Known,
        morphemes: node.morphemes.clone(),
        typo_cost: node.typo_cost + 1,
        lm_token_override: None,
    }
}

/// Like `CharCategory::classify`, but under `COMPATIBLE_JAMO` folds
/// standalone Hangul Compatibility Jamo (e.g. "ㅋ", "ㅏ" typed outside a
/// syllable block) into the jongseong category so they group into runs
/// instead of each becoming its own one-character unknown node.
fn classify_with_options(c: char, options: MatchOptions) -> CharCategory {
    if options.contains(MatchOptions::COMPATIBLE_JAMO) && (0x3131..=0x318E).contains(&(c as u32)) {
        return CharCategory::HangulJamo;
    }
    CharCategory::classify(c)
}

/// Pattern matchers for URL/email/hashtag/mention/serial/hanja and a
/// repeated-character "iteration" token (e.g. "ㅋㅋㅋ" scoring as one
/// `SWK` node). Hand-rolled scans rather than a regex engine — no regex
/// crate anywhere in this workspace's dependency tree.
fn scan_patterns(text: &str, options: MatchOptions) -> Vec<(usize, usize, PosTag)> {
    let mut spans = Vec::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_len = text.len();

    if options.contains(MatchOptions::URL) {
        for prefix in ["https://", "http://"] {
            let mut search_from = 0;
            while let Some(rel) = text[search_from..].find(prefix) {
                let start = search_from + rel;
                let end = text[start..]
                    .find(char::is_whitespace)
                    .map(|off| start + off)
                    .unwrap_or(byte_len);
                spans.push((start, end, PosTag::WUrl));
                search_from = end;
            }
        }
    }

    if options.contains(MatchOptions::EMAIL) || options.contains(MatchOptions::MENTION) {
        for word in whitespace_words(text) {
            if let Some(at) = word.find('@') {
                let (start, slice) = word_span(text, word);
                if options.contains(MatchOptions::EMAIL) && slice[at + 1..].contains('.') {
                    spans.push((start, start + slice.len(), PosTag::WEmail));
                } else if options.contains(MatchOptions::MENTION) && at == 0 {
                    spans.push((start, start + slice.len(), PosTag::WMention));
                }
            }
        }
    }

    if options.contains(MatchOptions::HASHTAG) {
        for word in whitespace_words(text) {
            if word.starts_with('#') && word.len() > 1 {
                let (start, slice) = word_span(text, word);
                spans.push((start, start + slice.len(), PosTag::WHashtag));
            }
        }
    }

    if options.contains(MatchOptions::SERIAL) {
        for word in whitespace_words(text) {
            let has_digit = word.chars().any(|c| c.is_ascii_digit());
            let has_dash = word.contains('-');
            let alnum_dash = word.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
            if has_digit && has_dash && alnum_dash && word.len() >= 4 {
                let (start, slice) = word_span(text, word);
                spans.push((start, start + slice.len(), PosTag::WSerial));
            }
        }
    }

    if options.contains(MatchOptions::Z_CODA) {
        let mut i = 0;
        while i < chars.len() {
            let (start_byte, c) = chars[i];
            let mut j = i + 1;
            while j < chars.len() && chars[j].1 == c {
                j += 1;
            }
            let run = j - i;
            if run >= 3 {
                let end_byte = if j < chars.len() { chars[j].0 } else { byte_len };
                spans.push((start_byte, end_byte, PosTag::Swk));
            }
            i = j;
        }
    }

    spans.sort_by_key(|&(start, end, _)| (start, std::cmp::Reverse(end)));
    let mut result: Vec<(usize, usize, PosTag)> = Vec::new();
    let mut last_end = 0usize;
    for (start, end, tag) in spans {
        if start < last_end {
            continue;
        }
        last_end = end;
        result.push((start, end, tag));
    }
    result
}

fn whitespace_words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

fn word_span<'a>(text: &'a str, word: &'a str) -> (usize, &'a str) {
    let start = word.as_ptr() as usize - text.as_ptr() as usize;
    (start, word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_url_up_to_whitespace() {
        let spans = scan_patterns("https://kiwi.io 좋아요!", MatchOptions::URL);
        assert_eq!(spans, vec![(0, "https://kiwi.io".len(), PosTag::WUrl)]);
    }

    #[test]
    fn scans_repeated_char_run_as_swk() {
        let spans = scan_patterns("ㅋㅋㅋ", MatchOptions::Z_CODA);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].2, PosTag::Swk);
    }

    #[test]
    fn compatible_jamo_folds_into_jongseong_category_when_enabled() {
        let c = 'ㅋ';
        assert_eq!(classify_with_options(c, MatchOptions::empty()), CharCategory::Other);
        assert_eq!(
            classify_with_options(c, MatchOptions::COMPATIBLE_JAMO),
            CharCategory::HangulJamo
        );
    }

    #[test]
    fn extend_node_grows_span_by_one_char_and_adds_typo_cost() {
        let node = LatticeNode {
            start: 0,
            end: 3,
            kind: NodeKind::Known,
            morphemes: vec![MorphemeId(0)],
            typo_cost: 0,
            lm_token_override: None,
        };
        let extended = extend_node(&node, '\u{11A8}');
        assert_eq!(extended.start, 0);
        assert_eq!(extended.end, 3 + '\u{11A8}'.len_utf8());
        assert_eq!(extended.typo_cost, 1);
    }

    #[test]
    fn scans_hashtag_and_mention_distinctly() {
        let spans = scan_patterns(
            "#키위 @user 안녕",
            MatchOptions::HASHTAG | MatchOptions::MENTION,
        );
        assert!(spans.iter().any(|s| s.2 == PosTag::WHashtag));
        assert!(spans.iter().any(|s| s.2 == PosTag::WMention));
    }
}
