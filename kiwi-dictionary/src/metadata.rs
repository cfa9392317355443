//! Model-level metadata: the logical header describing an n-gram LM blob
//! plus the dictionary's schema, loaded alongside the tables themselves.

use serde::{Deserialize, Serialize};

use crate::schema::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LmModelType {
    /// Kneser-Ney smoothed n-gram trie (the default and only variant this
    /// crate scores directly; `Sbg`/`Cong`/`CongGlobal` plug into the same
    /// `advance`-shaped contract via `kiwi_dictionary::lm::LanguageModel`
    /// but their construction is a build-time collaborator out of scope
    /// here).
    Knlm,
    Sbg,
    Cong,
    CongGlobal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LmMetadata {
    pub model_type: LmModelType,
    pub order: u8,
    pub vocab_size: u32,
    pub quantization_bits: u8,
    /// Mean observed token-run length, used by the unknown-morpheme
    /// log-Poisson length prior (see `kiwi::search`).
    pub unknown_length_lambda: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub dictionary_schema: Schema,
    pub lm: LmMetadata,
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata {
            dictionary_schema: Schema::default_ko(),
            lm: LmMetadata {
                model_type: LmModelType::Knlm,
                order: 4,
                vocab_size: 0,
                quantization_bits: 8,
                unknown_length_lambda: 2.5,
            },
        }
    }
}
