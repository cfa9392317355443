//! Output records: one `Token` per morpheme in a result path, plus the
//! `AnalysisResult` wrapping a full top-N path.

use std::borrow::Cow;

use kiwi_dictionary::{MorphemeId, PosTag};

/// One morpheme occurrence in an analysis result.
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub surface: Cow<'a, str>,
    pub tag: PosTag,
    pub sense_id: u16,
    /// Start offset into the *original* input, in UTF-16 code units.
    pub start_pos: u32,
    /// Length in UTF-16 code units.
    pub length: u32,
    /// This token's own contribution to the path score (LM delta + priors
    /// for the edge that produced it), not the cumulative path score.
    pub score: f32,
    pub typo_cost: u16,
    /// Index of this token's matching bracket partner, if this token is a
    /// bracket/quote and pairing was resolved; `None` otherwise.
    pub paired_bracket: Option<u32>,
    /// Index of the sub-sentence this token belongs to, after re-splitting
    /// an over-long sentence at a safe boundary.
    pub sub_sent_position: u32,
    pub dialect: super::options::Dialects,
    pub morpheme: MorphemeId,
}

/// One of the top-N candidate analyses for a single sentence.
#[derive(Debug, Clone)]
pub struct AnalysisResult<'a> {
    pub tokens: Vec<Token<'a>>,
    pub score: f32,
}

/// `Token` with an owned surface, for carrying analysis results across a
/// thread boundary (see `crate::pool`) where the borrowed input text
/// can't outlive the call that produced it.
#[derive(Debug, Clone)]
pub struct OwnedToken {
    pub surface: String,
    pub tag: PosTag,
    pub sense_id: u16,
    pub start_pos: u32,
    pub length: u32,
    pub score: f32,
    pub typo_cost: u16,
    pub paired_bracket: Option<u32>,
    pub sub_sent_position: u32,
    pub dialect: super::options::Dialects,
    pub morpheme: MorphemeId,
}

impl<'a> From<Token<'a>> for OwnedToken {
    fn from(t: Token<'a>) -> Self {
        OwnedToken {
            surface: t.surface.into_owned(),
            tag: t.tag,
            sense_id: t.sense_id,
            start_pos: t.start_pos,
            length: t.length,
            score: t.score,
            typo_cost: t.typo_cost,
            paired_bracket: t.paired_bracket,
            sub_sent_position: t.sub_sent_position,
            dialect: t.dialect,
            morpheme: t.morpheme,
        }
    }
}
