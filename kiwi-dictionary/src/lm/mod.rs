//! N-gram language model.

pub mod quantize;
pub mod trie;

pub use trie::{KnLmTrie, LmState};

/// Tagged-variant dispatch over LM implementations, all exposing the same
/// `advance`/`vocab_size` contract (per DESIGN NOTES: model variants are a
/// tagged enum, not a trait-object hierarchy mirroring the source's
/// virtual dispatch). Only `Knlm` is implemented; the others are named so
/// a future build-time collaborator can plug a trained model in without
/// changing any call site.
pub enum LanguageModel {
    Knlm(KnLmTrie),
}

impl LanguageModel {
    pub fn vocab_size(&self) -> u32 {
        match self {
            LanguageModel::Knlm(trie) => trie.vocab_size(),
        }
    }

    pub fn root_state(&self) -> LmState {
        match self {
            LanguageModel::Knlm(trie) => trie.root_state(),
        }
    }

    pub fn advance(&self, state: LmState, token: u32) -> (LmState, f32) {
        match self {
            LanguageModel::Knlm(trie) => trie.advance(state, token),
        }
    }
}
