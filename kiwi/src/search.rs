//! Beam search over the lattice: a per-node beam of `(lmState, score)`
//! hypotheses carried forward through the DAG, merged by node and
//! state, with a final top-N backtrace over the surviving paths.

use kiwi_dictionary::dictionary::Dictionary;
use kiwi_dictionary::form::VowelClass;
use kiwi_dictionary::lm::LmState;
use kiwi_dictionary::morpheme::{MorphemeId, PolarityConstraint, VowelConstraint};
use kiwi_dictionary::pos::regularize;
use log::warn;

use crate::lattice::{Lattice, NodeId, NodeKind};
use crate::options::{AnalyzeRequest, Dialects};

const SPACE_PENALTY: f32 = 0.3;
const TYPO_PENALTY: f32 = 1.0;
const CUTOFF_THRESHOLD: f32 = 8.0;
const BEAM_WIDTH: usize = 8;

/// One extension of a path through the lattice, stored in a flat arena so
/// hypotheses share common tails instead of each carrying its own
/// `Vec<MorphemeId>`.
#[derive(Debug, Clone, Copy)]
struct HypEntry {
    prev: Option<usize>,
    node: NodeId,
    morpheme: MorphemeId,
    lm_state: LmState,
    acc_score: f32,
    combine_socket: u16,
    last_vowel_cond: VowelClass,
    last_polarity: kiwi_dictionary::form::Polarity,
}

pub struct SearchResult {
    /// For each of the requested top-N outputs, the arena index of its
    /// final hypothesis (tail of the back-pointer chain) and its score.
    pub paths: Vec<(usize, f32)>,
    pub arena: Vec<HypEntryPublic>,
}

/// Public mirror of `HypEntry` exposed so `analyzer.rs` can walk
/// back-pointers without reaching into this module's private arena type.
#[derive(Debug, Clone, Copy)]
pub struct HypEntryPublic {
    pub prev: Option<usize>,
    pub node: NodeId,
    pub morpheme: MorphemeId,
    pub score: f32,
}

fn unknown_length_log_prior(lambda: f32, char_len: usize) -> f32 {
    // ln(Poisson(k; lambda)) = k*ln(lambda) - lambda - ln(k!)
    let k = char_len as f32;
    let ln_factorial_k = (1..=char_len).map(|i| (i as f32).ln()).sum::<f32>();
    k * lambda.ln() - lambda - ln_factorial_k
}

fn vowel_gate(constraint: VowelConstraint, last: VowelClass) -> bool {
    match constraint {
        VowelConstraint::None => true,
        VowelConstraint::Vowel => last == VowelClass::Vowel,
        VowelConstraint::NonVowel => last == VowelClass::NonVowel,
        VowelConstraint::Vocalic => true,
    }
}

fn polarity_gate(
    constraint: PolarityConstraint,
    last: kiwi_dictionary::form::Polarity,
) -> bool {
    use kiwi_dictionary::form::Polarity;
    match constraint {
        PolarityConstraint::None => true,
        PolarityConstraint::Yang => matches!(last, Polarity::Yang | Polarity::Neutral),
        PolarityConstraint::Eum => matches!(last, Polarity::Eum | Polarity::Neutral),
    }
}

/// Runs the beam search and returns up to `request.top_n` paths, each as
/// an arena index plus its total path score, ordered by descending score
/// with a deterministic morpheme-ID-lexicographic tie-break.
pub fn search(
    dict: &Dictionary,
    lattice: &Lattice,
    request: &AnalyzeRequest,
) -> SearchResult {
    let n = lattice.nodes.len();
    let mut arena: Vec<HypEntry> = Vec::new();
    let mut beam_at: Vec<Vec<usize>> = vec![Vec::new(); n];

    let start = lattice.start_node();
    let end = lattice.end_node();

    arena.push(HypEntry {
        prev: None,
        node: start,
        morpheme: MorphemeId(0),
        lm_state: dict.lm.root_state(),
        acc_score: 0.0,
        combine_socket: 0,
        last_vowel_cond: VowelClass::Vowel,
        last_polarity: kiwi_dictionary::form::Polarity::Neutral,
    });
    beam_at[start].push(0);

    // Process nodes in an order where every predecessor (by end position)
    // is finalized before its successors are considered.
    let mut order: Vec<NodeId> = (0..n).collect();
    order.sort_by_key(|&id| (lattice.nodes[id].end, lattice.nodes[id].start));

    for &node_id in &order {
        if node_id == start {
            continue;
        }
        let node = &lattice.nodes[node_id];
        let mut extensions: Vec<HypEntry> = Vec::new();

        for p in 0..=node.start {
            if lattice.ending_at[p].is_empty() {
                continue;
            }
            let num_spaces = match lattice.gap(p, node.start) {
                Some(s) => s,
                None => continue,
            };
            for &pred_id in &lattice.ending_at[p] {
                for &hyp_idx in &beam_at[pred_id] {
                    let hyp = arena[hyp_idx];
                    extend_node(dict, lattice, node, node_id, &hyp, hyp_idx, num_spaces, request, &mut extensions);
                }
            }
        }

        if extensions.is_empty() {
            continue;
        }

        // Merge hypotheses sharing (lm_state, combine_socket), keep max score.
        extensions.sort_by(|a, b| b.acc_score.partial_cmp(&a.acc_score).unwrap());
        let mut merged: Vec<HypEntry> = Vec::new();
        for ext in extensions {
            let dup = merged
                .iter()
                .any(|m| m.lm_state == ext.lm_state && m.combine_socket == ext.combine_socket);
            if !dup {
                merged.push(ext);
            }
        }

        // Cutoff + beam cap.
        let best = merged[0].acc_score;
        merged.retain(|h| h.acc_score >= best - CUTOFF_THRESHOLD);
        merged.truncate(BEAM_WIDTH.max(request.top_n));

        for hyp in merged {
            let idx = arena.len();
            arena.push(hyp);
            beam_at[node_id].push(idx);
        }
    }

    if beam_at[end].is_empty() {
        warn!(
            "beam emptied before reaching the end sentinel ({} chars of input, {} lattice nodes)",
            lattice.normalized_text.len(),
            n
        );
    }

    let mut ends: Vec<(usize, f32)> = beam_at[end]
        .iter()
        .map(|&idx| (idx, arena[idx].acc_score))
        .collect();
    ends.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap()
            .then_with(|| tie_break(&arena, a.0, b.0))
    });
    ends.truncate(request.top_n.max(1));

    let arena_public = arena
        .iter()
        .map(|h| HypEntryPublic {
            prev: h.prev,
            node: h.node,
            morpheme: h.morpheme,
            score: h.acc_score,
        })
        .collect();

    SearchResult {
        paths: ends,
        arena: arena_public,
    }
}

fn tie_break(arena: &[HypEntry], a: usize, b: usize) -> std::cmp::Ordering {
    let seq_a = morpheme_sequence(arena, a);
    let seq_b = morpheme_sequence(arena, b);
    seq_a.cmp(&seq_b)
}

fn morpheme_sequence(arena: &[HypEntry], mut idx: usize) -> Vec<u32> {
    let mut out = Vec::new();
    loop {
        out.push(arena[idx].morpheme.0);
        match arena[idx].prev {
            Some(p) => idx = p,
            None => break,
        }
    }
    out.reverse();
    out
}

#[allow(clippy::too_many_arguments)]
fn extend_node(
    dict: &Dictionary,
    lattice: &Lattice,
    node: &crate::lattice::LatticeNode,
    node_id: NodeId,
    hyp: &HypEntry,
    hyp_idx: usize,
    num_spaces: usize,
    request: &AnalyzeRequest,
    out: &mut Vec<HypEntry>,
) {
    if node_id == lattice.end_node() {
        out.push(HypEntry {
            prev: Some(hyp_idx),
            node: node_id,
            morpheme: hyp.morpheme,
            lm_state: hyp.lm_state,
            acc_score: hyp.acc_score,
            combine_socket: hyp.combine_socket,
            last_vowel_cond: hyp.last_vowel_cond,
            last_polarity: hyp.last_polarity,
        });
        return;
    }

    for &morph_id in &node.morphemes {
        if request.blocklist.contains(&morph_id) {
            continue;
        }
        let morpheme = dict.morpheme(morph_id);

        // Step 1: feature gate, with irregular-conjugation fallback.
        let vowel_ok = vowel_gate(morpheme.vowel_constraint, hyp.last_vowel_cond)
            || regularize(morpheme.tag).is_some();
        let polarity_ok = polarity_gate(morpheme.polarity_constraint, hyp.last_polarity);
        if !vowel_ok || !polarity_ok {
            continue;
        }

        // Step 2: combine-socket gate.
        if hyp.combine_socket != 0 {
            let matches_socket = morpheme
                .chunks
                .as_ref()
                .and_then(|chunks| chunks.first())
                .map(|c| dict.morpheme(c.morpheme).combine_socket == hyp.combine_socket)
                .unwrap_or(false);
            if !matches_socket {
                continue;
            }
        }

        // Step 3 & 4: chunked morphemes score one LM step per chunk;
        // unchunked morphemes score one LM step directly.
        let mut lm_state = hyp.lm_state;
        let mut delta = 0.0f32;
        let mut rejected = false;
        let tokens: Vec<u32> = match &morpheme.chunks {
            Some(chunks) => chunks
                .iter()
                .map(|c| dict.morpheme(c.morpheme).lm_morpheme_id)
                .collect(),
            None => vec![node.lm_token_override.unwrap_or(morpheme.lm_morpheme_id)],
        };
        for token in tokens {
            let (next_state, step_delta) = dict.lm.advance(lm_state, token);
            if !step_delta.is_finite() {
                rejected = true;
                break;
            }
            lm_state = next_state;
            delta += step_delta;
        }
        if rejected {
            continue;
        }

        // Step 5: priors & penalties.
        let mut score = hyp.acc_score + delta + morpheme.user_score;
        score -= SPACE_PENALTY * num_spaces as f32;
        if let NodeKind::Unknown(_) = node.kind {
            let lambda = dict.metadata.lm.unknown_length_lambda;
            let char_len = lattice.normalized_text[node.start..node.end].chars().count();
            score += unknown_length_log_prior(lambda, char_len);
        }
        if morpheme.dialect_bits != 0 {
            if request.allowed_dialects.bits() & morpheme.dialect_bits == 0 {
                continue;
            }
            if morpheme.dialect_bits != Dialects::STANDARD.bits() {
                score -= request.dialect_cost;
            }
        }
        score -= TYPO_PENALTY * node.typo_cost as f32;

        let new_combine_socket = if morpheme.is_chunked() {
            0
        } else {
            morpheme.combine_socket
        };

        let form = dict.form(morpheme.surface_form);
        out.push(HypEntry {
            prev: Some(hyp_idx),
            node: node_id,
            morpheme: morph_id,
            lm_state,
            acc_score: score,
            combine_socket: new_combine_socket,
            last_vowel_cond: form.vowel_class,
            last_polarity: form.polarity,
        });
    }
}
