//! The Kneser-Ney n-gram model's suffix trie: a single flat node arena
//! with signed back-off ("lower") offsets and sorted, binary-searchable
//! children.
//!
//! Child slots share storage between "this leads to a real node" and
//! "this leads to a leaf whose log-prob is encoded directly" the way the
//! source packs a pointer-offset or a reinterpreted float into one machine
//! word: here a positive `i32` is a node offset, and a non-positive value
//! is `-(leaf code)`, i.e. the leaf's quantized log-prob code negated (0
//! is a valid code, so leaves are distinguished by the *sign bit* check at
//! `<= 0`, not by non-zero-ness).

use serde::{Deserialize, Serialize};

use crate::lm::quantize::Codebook;

/// Opaque state handle into the trie. Logically a 64-bit index per the
/// `advance` contract; internally it's a node index into a single arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LmState(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeMeta {
    first_child: u32,
    num_children: u32,
    /// Signed offset to the back-off (failure) node; 0 at the root.
    lower: i32,
    /// This node's own log-prob, given its parent context (root: unused).
    log_prob_code: u8,
    gamma_code: u8,
}

enum ChildSlot {
    Node(u32),
    Leaf(u8),
}

fn decode_slot(raw: i32) -> ChildSlot {
    if raw > 0 {
        ChildSlot::Node(raw as u32)
    } else {
        ChildSlot::Leaf((-raw) as u8)
    }
}

fn encode_node_slot(child_index: u32) -> i32 {
    debug_assert!(child_index > 0, "node 0 is the root and is never a child target");
    child_index as i32
}

fn encode_leaf_slot(code: u8) -> i32 {
    -(code as i32)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnLmTrie {
    nodes: Vec<NodeMeta>,
    child_keys: Vec<u32>,
    child_values: Vec<i32>,
    log_prob_codebook: Codebook,
    gamma_codebook: Codebook,
    unk_log_prob: f32,
    vocab_size: u32,
    /// Optional history transformer: rewrites a raw dictionary LM token ID
    /// before lookup (e.g. collapsing an irregular-conjugation variant to
    /// its regular lemma).
    history_transform: Option<Vec<u32>>,
}

const ROOT: u32 = 0;

impl KnLmTrie {
    pub fn builder() -> KnLmTrieBuilder {
        KnLmTrieBuilder::default()
    }

    pub fn vocab_size(&self) -> u32 {
        self.vocab_size
    }

    pub fn root_state(&self) -> LmState {
        LmState(ROOT as u64)
    }

    fn transform(&self, token: u32) -> u32 {
        match &self.history_transform {
            Some(table) => table.get(token as usize).copied().unwrap_or(token),
            None => token,
        }
    }

    fn children_of(&self, node: u32) -> (&[u32], &[i32]) {
        let meta = &self.nodes[node as usize];
        let start = meta.first_child as usize;
        let end = start + meta.num_children as usize;
        (&self.child_keys[start..end], &self.child_values[start..end])
    }

    fn find_child(&self, node: u32, token: u32) -> Option<ChildSlot> {
        let (keys, values) = self.children_of(node);
        keys.binary_search(&token)
            .ok()
            .map(|idx| decode_slot(values[idx]))
    }

    fn lower(&self, node: u32) -> u32 {
        let offset = self.nodes[node as usize].lower;
        (node as i64 + offset as i64) as u32
    }

    fn gamma(&self, node: u32) -> f32 {
        self.gamma_codebook.dequantize(self.nodes[node as usize].gamma_code)
    }

    fn node_log_prob(&self, node: u32) -> f32 {
        self.log_prob_codebook.dequantize(self.nodes[node as usize].log_prob_code)
    }

    /// Walks the failure chain starting one step below `node` looking for
    /// a deeper context that itself extends by `token` into a real node —
    /// "position the next state via an additional failure step" for leaf
    /// hits, per the back-off policy this crate follows (see DESIGN.md).
    fn find_fail(&self, node: u32, token: u32) -> u32 {
        let mut cur = node;
        loop {
            if cur == ROOT {
                return match self.find_child(ROOT, token) {
                    Some(ChildSlot::Node(child)) => child,
                    _ => ROOT,
                };
            }
            cur = self.lower(cur);
            match self.find_child(cur, token) {
                Some(ChildSlot::Node(child)) => return child,
                _ => continue,
            }
        }
    }

    /// `advance(state, token) -> (new_state, delta_log_prob)`.
    pub fn advance(&self, state: LmState, token: u32) -> (LmState, f32) {
        let token = self.transform(token);
        let mut node = state.0 as u32;
        let mut acc_gamma = 0.0f32;
        loop {
            match self.find_child(node, token) {
                Some(ChildSlot::Node(child)) => {
                    let log_prob = acc_gamma + self.node_log_prob(child);
                    return (LmState(child as u64), log_prob);
                }
                Some(ChildSlot::Leaf(code)) => {
                    let log_prob = acc_gamma + self.log_prob_codebook.dequantize(code);
                    let next = self.find_fail(node, token);
                    return (LmState(next as u64), log_prob);
                }
                None => {
                    acc_gamma += self.gamma(node);
                    if node == ROOT {
                        let next = match self.find_child(ROOT, token) {
                            Some(ChildSlot::Node(child)) => child,
                            _ => ROOT,
                        };
                        return (LmState(next as u64), acc_gamma + self.unk_log_prob);
                    }
                    node = self.lower(node);
                }
            }
        }
    }

    /// Scores a whole token sequence from the root context, for testing
    /// property 6 (per-step `advance` sums equal a direct `logP`).
    pub fn score_sequence(&self, tokens: &[u32]) -> f32 {
        let mut state = self.root_state();
        let mut total = 0.0f32;
        for &token in tokens {
            let (next, delta) = self.advance(state, token);
            total += delta;
            state = next;
        }
        total
    }
}

#[derive(Default)]
pub struct KnLmTrieBuilder {
    nodes: Vec<NodeMeta>,
    child_keys: Vec<u32>,
    child_values: Vec<i32>,
    unk_log_prob: f32,
    vocab_size: u32,
    history_transform: Option<Vec<u32>>,
    log_prob_centers: Vec<f32>,
    gamma_centers: Vec<f32>,
}

impl KnLmTrieBuilder {
    /// Appends one node to the arena; returns its index. `lower` is a
    /// signed offset relative to the node's own (not-yet-known) index, so
    /// callers typically build bottom-up and patch `lower` once the target
    /// index is known, or compute offsets against already-appended nodes.
    pub fn push_node(&mut self, log_prob_code: u8, gamma_code: u8, lower_offset: i32) -> u32 {
        let idx = self.nodes.len() as u32;
        self.nodes.push(NodeMeta {
            first_child: 0,
            num_children: 0,
            lower: lower_offset,
            log_prob_code,
            gamma_code,
        });
        idx
    }

    /// Attaches a sorted set of children to `node`. `children` maps token
    /// ID to either `Ok(child_node_index)` (a real node) or
    /// `Err(leaf_log_prob_code)` (a leaf).
    pub fn set_children(&mut self, node: u32, mut children: Vec<(u32, Result<u32, u8>)>) {
        children.sort_by_key(|(k, _)| *k);
        let first_child = self.child_keys.len() as u32;
        for (key, slot) in &children {
            self.child_keys.push(*key);
            self.child_values.push(match slot {
                Ok(child_index) => encode_node_slot(*child_index),
                Err(code) => encode_leaf_slot(*code),
            });
        }
        let meta = &mut self.nodes[node as usize];
        meta.first_child = first_child;
        meta.num_children = children.len() as u32;
    }

    pub fn unk_log_prob(mut self, v: f32) -> Self {
        self.unk_log_prob = v;
        self
    }

    pub fn vocab_size(mut self, v: u32) -> Self {
        self.vocab_size = v;
        self
    }

    pub fn history_transform(mut self, table: Vec<u32>) -> Self {
        self.history_transform = Some(table);
        self
    }

    pub fn log_prob_codebook(mut self, centers: Vec<f32>) -> Self {
        self.log_prob_centers = centers;
        self
    }

    pub fn gamma_codebook(mut self, centers: Vec<f32>) -> Self {
        self.gamma_centers = centers;
        self
    }

    pub fn build(self) -> KnLmTrie {
        KnLmTrie {
            nodes: self.nodes,
            child_keys: self.child_keys,
            child_values: self.child_values,
            log_prob_codebook: Codebook::from_centers(self.log_prob_centers),
            gamma_codebook: Codebook::from_centers(self.gamma_centers),
            unk_log_prob: self.unk_log_prob,
            vocab_size: self.vocab_size,
            history_transform: self.history_transform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a tiny bigram-only model: root -(token 1, leaf p=-1.0)->,
    /// root -(token 2, node)-> node2 -(token 1, leaf p=-0.5)->, with
    /// gamma(root) = -2.0 for the back-off miss case.
    fn sample() -> KnLmTrie {
        let log_probs = vec![-3.0, -1.0, -0.5, 0.0];
        let gammas = vec![-2.0, 0.0];
        let mut builder = KnLmTrie::builder()
            .unk_log_prob(-5.0)
            .vocab_size(3)
            .log_prob_codebook(log_probs)
            .gamma_codebook(gammas);

        let root = builder.push_node(0, 0, 0); // root's own log_prob unused
        let node2 = builder.push_node(2, 1, -1); // log_prob code 2 (-0.5), gamma code 1 (0.0), lower -1 -> root
        builder.set_children(root, vec![(1, Err(1)), (2, Ok(node2))]);
        builder.set_children(node2, vec![(1, Err(2))]);
        let _ = root;
        builder.build()
    }

    #[test]
    fn leaf_hit_from_root_returns_its_log_prob() {
        let trie = sample();
        let (_, delta) = trie.advance(trie.root_state(), 1);
        assert_eq!(delta, -1.0);
    }

    #[test]
    fn node_hit_returns_log_prob_and_advances_state() {
        let trie = sample();
        let (state, delta) = trie.advance(trie.root_state(), 2);
        assert_eq!(delta, -0.5);
        assert_eq!(state, LmState(1));
    }

    #[test]
    fn unknown_token_backs_off_to_unk_log_prob() {
        let trie = sample();
        let (_, delta) = trie.advance(trie.root_state(), 99);
        assert_eq!(delta, -5.0);
    }

    #[test]
    fn score_sequence_sums_per_step_deltas() {
        let trie = sample();
        let total = trie.score_sequence(&[2, 1]);
        let (s1, d1) = trie.advance(trie.root_state(), 2);
        let (_, d2) = trie.advance(s1, 1);
        assert_eq!(total, d1 + d2);
    }
}
