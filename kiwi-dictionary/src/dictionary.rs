//! The frozen, read-only `Dictionary` plus the `DictionaryBuilder` that
//! assembles it from a compiled base and user additions before
//! `finalize()`.

use std::collections::HashMap;
use std::path::Path;

use crate::automaton::{AutomatonEntry, FormAutomaton};
use crate::error::{KiwiDictionaryErrorKind, KiwiDictionaryResult};
use crate::form::{Form, FormId};
use crate::hangul;
use crate::lm::LanguageModel;
use crate::loader::ModelLoader;
use crate::metadata::Metadata;
use crate::morpheme::{Chunk, Morpheme, MorphemeId, PolarityConstraint, VowelConstraint};
use crate::pos::PosTag;
use crate::unknown_dictionary::UnknownDictionary;

/// The frozen dictionary: forms, morphemes, the form automaton, the
/// language model, and the unknown-word defaults. Immutable after
/// construction and safe to share by reference across threads (per
/// the concurrency model: no shared mutable state across analyses).
pub struct Dictionary {
    forms: Vec<Form>,
    morphemes: Vec<Morpheme>,
    automaton: FormAutomaton,
    pub lm: LanguageModel,
    pub unknown_dictionary: UnknownDictionary,
    pub metadata: Metadata,
}

impl Dictionary {
    pub fn form(&self, id: FormId) -> &Form {
        &self.forms[id.0 as usize]
    }

    pub fn morpheme(&self, id: MorphemeId) -> &Morpheme {
        &self.morphemes[id.0 as usize]
    }

    pub fn morpheme_count(&self) -> usize {
        self.morphemes.len()
    }

    /// The representative morpheme of `id`'s allomorph group: `add_word`
    /// seeds a group's `group_id` with its own index, and
    /// `add_alias_word` copies that `group_id` onto every allomorph added
    /// after it, so the group's first (priority-ordered) member's own ID
    /// doubles as the group's canonical ID.
    pub fn canonical_morpheme(&self, id: MorphemeId) -> MorphemeId {
        MorphemeId(self.morpheme(id).group_id)
    }

    pub fn automaton(&self) -> &FormAutomaton {
        &self.automaton
    }

    /// Exact-surface lookup via the form automaton, for tests and callers
    /// that just need "does this normalized string name a known form".
    pub fn find_surface_form(&self, normalized_surface: &str) -> Option<FormId> {
        self.automaton
            .find_surface(normalized_surface)
            .first()
            .map(|entry| entry.form_id)
    }

    /// Default morpheme ID for a POS tag's reserved slot (invariant iv):
    /// the reserved range is the first 64 morpheme IDs, one per `PosTag`
    /// discriminant, assigned at `finalize()` time.
    pub fn default_morpheme(&self, tag: PosTag) -> MorphemeId {
        MorphemeId(tag as u32)
    }

    pub fn load_from_path(dict_path: &Path) -> KiwiDictionaryResult<Self> {
        let metadata: Metadata = Metadata::load_from_path(dict_path, "metadata.bin")?;
        let forms: Vec<Form> = Vec::load_from_path(dict_path, "forms.bin")?;
        let morphemes: Vec<Morpheme> = Vec::load_from_path(dict_path, "morphemes.bin")?;
        let unknown_dictionary: UnknownDictionary =
            UnknownDictionary::load_from_path(dict_path, "unknown.bin")?;

        let automaton_patterns: Vec<(String, Vec<AutomatonEntry>)> = forms
            .iter()
            .enumerate()
            .map(|(idx, form)| {
                (
                    form.normalized.clone(),
                    vec![AutomatonEntry::exact(FormId(idx as u32))],
                )
            })
            .collect();
        let automaton = FormAutomaton::build(automaton_patterns)?;

        let lm_trie = crate::lm::KnLmTrie::load_from_path(dict_path, "lm.bin")?;

        Ok(Dictionary {
            forms,
            morphemes,
            automaton,
            lm: LanguageModel::Knlm(lm_trie),
            unknown_dictionary,
            metadata,
        })
    }
}

/// One compiled stem+ending fusion rule: `stem` and `ending` are partials
/// (via `add_partial_stem`/`add_partial_ending`) sharing a socket. Deriving
/// these from a raw conjugation table is an external collaborator; the
/// builder only consumes already-compiled rules and wires the `combined`
/// cross-reference at `finalize` time.
#[derive(Debug, Clone, Copy)]
pub struct CombineRule {
    pub stem: MorphemeId,
    pub ending: MorphemeId,
}

pub struct DictionaryBuilder {
    form_index: HashMap<String, FormId>,
    forms: Vec<Form>,
    morphemes: Vec<Morpheme>,
    combine_rules: Vec<CombineRule>,
    finalized: bool,
}

impl Default for DictionaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DictionaryBuilder {
    pub fn new() -> Self {
        let mut builder = DictionaryBuilder {
            form_index: HashMap::new(),
            forms: Vec::new(),
            morphemes: Vec::new(),
            combine_rules: Vec::new(),
            finalized: false,
        };
        // Reserve one default morpheme per POS tag so `Dictionary::default_morpheme`
        // is O(1) after finalize (invariant iv).
        for tag in ALL_TAGS {
            builder.add_word(tag.as_str(), tag, 0.0);
        }
        builder
    }

    fn normalize_surface(&self, surface: &str) -> String {
        hangul::normalize(surface)
            .map(|n| n.chars.into_iter().collect())
            .unwrap_or_else(|_| surface.to_string())
    }

    /// Normalized-byte-space boundaries between `surface`'s original
    /// characters: `[0, b1, b2, ..., len]`, where consecutive entries
    /// bracket one original character's normalized span (two normalized
    /// chars wide for a coda-split syllable, one otherwise). Never a
    /// boundary inside a coda-split pair.
    fn group_boundaries(&self, surface: &str) -> Vec<u32> {
        match hangul::normalize(surface) {
            Ok(normalized) if !normalized.chars.is_empty() => {
                let mut boundaries = vec![0u32];
                let mut byte_acc = 0u32;
                let mut i = 0;
                while i < normalized.chars.len() {
                    let mut j = i + 1;
                    while j < normalized.chars.len() && normalized.pos_map[j] == normalized.pos_map[i] {
                        j += 1;
                    }
                    for c in &normalized.chars[i..j] {
                        byte_acc += c.len_utf8() as u32;
                    }
                    boundaries.push(byte_acc);
                    i = j;
                }
                boundaries
            }
            _ => {
                let len = surface.len() as u32;
                if len == 0 {
                    vec![0]
                } else {
                    vec![0, len]
                }
            }
        }
    }

    fn form_id_for(&mut self, normalized_surface: &str) -> FormId {
        if let Some(&id) = self.form_index.get(normalized_surface) {
            return id;
        }
        let id = FormId(self.forms.len() as u32);
        self.forms
            .push(Form::new(normalized_surface.to_string(), Vec::new()));
        self.form_index.insert(normalized_surface.to_string(), id);
        id
    }

    /// `addWord`: inserts a brand-new morpheme for `surface`, scored as its
    /// own LM token.
    pub fn add_word(&mut self, surface: &str, tag: PosTag, user_score: f32) -> MorphemeId {
        let normalized = self.normalize_surface(surface);
        let form_id = self.form_id_for(&normalized);
        let morph_id = MorphemeId(self.morphemes.len() as u32);
        self.morphemes.push(Morpheme {
            surface_form: form_id,
            tag,
            sense_id: 0,
            vowel_constraint: VowelConstraint::None,
            polarity_constraint: PolarityConstraint::None,
            combine_socket: 0,
            combined: 0,
            chunks: None,
            lm_morpheme_id: morph_id.0,
            group_id: morph_id.0,
            user_score,
            dialect_bits: 0,
        });
        self.forms[form_id.0 as usize].candidates.push(morph_id);
        morph_id
    }

    /// `addAliasWord`: a new surface that should be scored exactly like an
    /// existing morpheme (same LM token, same tag/constraints).
    pub fn add_alias_word(
        &mut self,
        surface: &str,
        base: MorphemeId,
    ) -> KiwiDictionaryResult<MorphemeId> {
        let base_morpheme = self.morphemes.get(base.0 as usize).cloned().ok_or_else(|| {
            KiwiDictionaryErrorKind::UnknownMorpheme
                .with_error(anyhow::anyhow!("addAliasWord: base morpheme {:?} not found", base))
        })?;

        let normalized = self.normalize_surface(surface);
        let form_id = self.form_id_for(&normalized);
        let morph_id = MorphemeId(self.morphemes.len() as u32);
        self.morphemes.push(Morpheme {
            surface_form: form_id,
            lm_morpheme_id: base_morpheme.lm_morpheme_id,
            group_id: base_morpheme.group_id,
            chunks: None,
            combined: 0,
            combine_socket: 0,
            ..base_morpheme
        });
        self.forms[form_id.0 as usize].candidates.push(morph_id);
        Ok(morph_id)
    }

    /// Marks `morph`'s surface form as eligible for direct Z-coda jamo
    /// attachment (`MatchOptions::Z_CODA`) during lattice construction.
    pub fn mark_z_coda_appendable(&mut self, morph: MorphemeId) {
        let form_id = self.morphemes[morph.0 as usize].surface_form;
        self.forms[form_id.0 as usize].z_coda_appendable = true;
    }

    /// Marks `morph`'s surface form as eligible for sai-siot attachment
    /// (`MatchOptions::MERGE_SAISIOT`/`SPLIT_SAISIOT`) during lattice
    /// construction.
    pub fn mark_z_siot_appendable(&mut self, morph: MorphemeId) {
        let form_id = self.morphemes[morph.0 as usize].surface_form;
        self.forms[form_id.0 as usize].z_siot_appendable = true;
    }

    /// Registers the stem half of a stem+ending fusion, carrying `socket`.
    /// It matches at its own lattice position like any other morpheme, then
    /// carries `socket` forward onto the hypothesis (the bottom of
    /// `extend_node`'s gate in `kiwi::search`) until a partial ending on
    /// the same socket closes it.
    pub fn add_partial_stem(
        &mut self,
        surface: &str,
        tag: PosTag,
        socket: u16,
        user_score: f32,
    ) -> KiwiDictionaryResult<MorphemeId> {
        if socket == 0 {
            return Err(KiwiDictionaryErrorKind::Args
                .with_error(anyhow::anyhow!("addPartialStem: socket 0 means \"not a partial\"")));
        }
        Ok(self.push_partial(surface, tag, socket, None, user_score))
    }

    /// Registers the completing (ending) half of a stem+ending fusion on
    /// `socket`. Realized as a one-chunk morpheme whose sole chunk refers
    /// to itself: the beam search's combine-socket gate requires the
    /// extending morpheme to be chunked and to start with a morpheme
    /// carrying the hypothesis's pending socket, which this satisfies only
    /// once a partial stem on the same socket has been seen.
    pub fn add_partial_ending(
        &mut self,
        surface: &str,
        tag: PosTag,
        socket: u16,
        user_score: f32,
    ) -> KiwiDictionaryResult<MorphemeId> {
        if socket == 0 {
            return Err(KiwiDictionaryErrorKind::Args
                .with_error(anyhow::anyhow!("addPartialEnding: socket 0 means \"not a partial\"")));
        }
        let normalized_len = self.normalize_surface(surface).len() as u32;
        let morph_id = MorphemeId(self.morphemes.len() as u32);
        let chunk = Chunk {
            morpheme: morph_id,
            byte_start: 0,
            byte_end: normalized_len,
        };
        Ok(self.push_partial(surface, tag, socket, Some(vec![chunk]), user_score))
    }

    fn push_partial(
        &mut self,
        surface: &str,
        tag: PosTag,
        socket: u16,
        chunks: Option<Vec<Chunk>>,
        user_score: f32,
    ) -> MorphemeId {
        let normalized = self.normalize_surface(surface);
        let form_id = self.form_id_for(&normalized);
        let morph_id = MorphemeId(self.morphemes.len() as u32);
        self.morphemes.push(Morpheme {
            surface_form: form_id,
            tag,
            sense_id: 0,
            vowel_constraint: VowelConstraint::None,
            polarity_constraint: PolarityConstraint::None,
            combine_socket: socket,
            combined: 0,
            chunks,
            lm_morpheme_id: morph_id.0,
            group_id: morph_id.0,
            user_score,
            dialect_bits: 0,
        });
        self.forms[form_id.0 as usize].candidates.push(morph_id);
        morph_id
    }

    /// Registers a compiled stem+ending fusion rule: `stem` and `ending`
    /// must already be registered partials (via `add_partial_stem` /
    /// `add_partial_ending`) sharing one nonzero socket. `finalize`'s
    /// combining stage wires their mutual `combined` offset once both
    /// morpheme indices are final.
    pub fn add_combine_rule(&mut self, stem: MorphemeId, ending: MorphemeId) -> KiwiDictionaryResult<()> {
        let stem_socket = self.morphemes.get(stem.0 as usize).map(|m| m.combine_socket);
        let ending_socket = self.morphemes.get(ending.0 as usize).map(|m| m.combine_socket);
        match (stem_socket, ending_socket) {
            (Some(s), Some(e)) if s != 0 && s == e => {}
            _ => {
                log::warn!("rejected combine rule between {stem:?} and {ending:?}: socket mismatch");
                return Err(KiwiDictionaryErrorKind::Args.with_error(anyhow::anyhow!(
                    "addCombineRule: stem and ending must both be registered partials sharing one socket"
                )));
            }
        }
        self.combine_rules.push(CombineRule { stem, ending });
        Ok(())
    }

    /// `addPreAnalyzedWord`: registers a compound surface whose analysis is
    /// pinned to a fixed chunk sequence (e.g. "사겼다" = 사귀+었+다).
    pub fn add_pre_analyzed_word(
        &mut self,
        surface: &str,
        tag: PosTag,
        chunk_parts: &[(MorphemeId, &str)],
    ) -> KiwiDictionaryResult<MorphemeId> {
        for (morph_id, _) in chunk_parts {
            if morph_id.0 as usize >= self.morphemes.len() {
                return Err(KiwiDictionaryErrorKind::UnknownMorpheme.with_error(anyhow::anyhow!(
                    "addPreAnalyzedWord: chunk morpheme {:?} not found",
                    morph_id
                )));
            }
        }

        let normalized = self.normalize_surface(surface);
        // Chunk offsets are measured in the *normalized* (coda-split) byte
        // space the lattice matches against. They can't simply sum each
        // chunk surface's own normalized length: an irregular-conjugation
        // contraction (e.g. 사귀+었 -> 겼 in "사겼다") means the chunk
        // surfaces don't literally concatenate back to the compound
        // surface, and a naive byte split can cut a coda-split pair in
        // half, splitting one original syllable across two chunks.
        // Instead the compound's own normalized form is divided at its
        // syllable-group boundaries (never inside a coda-split pair), with
        // the `chunk_parts` count of groups distributed evenly and the
        // final chunk absorbing any remainder.
        let boundaries = self.group_boundaries(surface);
        let num_groups = boundaries.len() - 1;
        let chunk_count = chunk_parts.len().max(1);

        let mut chunks = Vec::with_capacity(chunk_parts.len());
        let mut group_pos = 0usize;
        for (i, (morph_id, _)) in chunk_parts.iter().enumerate() {
            let is_last = i + 1 == chunk_parts.len();
            let group_end = if is_last {
                num_groups
            } else {
                (group_pos + num_groups / chunk_count).min(num_groups)
            };
            chunks.push(Chunk {
                morpheme: *morph_id,
                byte_start: boundaries[group_pos],
                byte_end: boundaries[group_end],
            });
            group_pos = group_end;
        }

        let form_id = self.form_id_for(&normalized);
        let morph_id = MorphemeId(self.morphemes.len() as u32);
        self.morphemes.push(Morpheme {
            surface_form: form_id,
            tag,
            sense_id: 0,
            vowel_constraint: VowelConstraint::None,
            polarity_constraint: PolarityConstraint::None,
            combine_socket: 0,
            combined: 0,
            chunks: Some(chunks),
            lm_morpheme_id: morph_id.0,
            group_id: morph_id.0,
            user_score: 0.0,
            dialect_bits: 0,
        });
        self.forms[form_id.0 as usize].candidates.push(morph_id);
        Ok(morph_id)
    }

    /// `addRule`: generates one new morpheme per existing morpheme of
    /// `tag`, by applying `transform` to that morpheme's surface (e.g. an
    /// orthographic-variant rule).
    pub fn add_rule(&mut self, tag: PosTag, transform: impl Fn(&str) -> String) -> Vec<MorphemeId> {
        let candidates: Vec<MorphemeId> = self
            .morphemes
            .iter()
            .enumerate()
            .filter(|(_, m)| m.tag == tag)
            .map(|(idx, _)| MorphemeId(idx as u32))
            .collect();

        let mut generated = Vec::with_capacity(candidates.len());
        for morph_id in candidates {
            let original_surface = self.forms[self.morphemes[morph_id.0 as usize].surface_form.0 as usize]
                .normalized
                .clone();
            let new_surface = transform(&original_surface);
            if new_surface == original_surface {
                continue;
            }
            generated.push(self.add_word(&new_surface, tag, 0.0));
        }
        generated
    }

    /// `loadDictionary`: bulk-loads a CSV text dictionary where each row is
    /// `surface,pos_tag,user_score`, following the schema's common-field
    /// layout (surface at index 0; pos_tag/user_score are custom fields
    /// here for brevity — a fuller loader would read every custom field
    /// named in `Schema::default_ko()`).
    pub fn load_dictionary(&mut self, csv_text: &str) -> KiwiDictionaryResult<usize> {
        let mut count = 0;
        for line in csv_text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split(',');
            let surface = fields.next().ok_or_else(|| {
                KiwiDictionaryErrorKind::Format.with_error(anyhow::anyhow!("empty dictionary row"))
            })?;
            let tag_str = fields.next().ok_or_else(|| {
                KiwiDictionaryErrorKind::Format.with_error(anyhow::anyhow!("missing pos_tag field"))
            })?;
            let tag: PosTag = tag_str.parse()?;
            let user_score: f32 = fields
                .next()
                .unwrap_or("0")
                .parse()
                .map_err(|err| KiwiDictionaryErrorKind::Format.with_error(anyhow::anyhow!(err)))?;
            self.add_word(surface, tag, user_score);
            count += 1;
        }
        Ok(count)
    }

    /// Freezes the builder into a queryable `Dictionary`: runs the
    /// allomorph-combining stage over any registered `CombineRule`s, sorts
    /// forms by surface, builds the form automaton, and attaches the
    /// (already loaded/compiled) language model and unknown-word table.
    pub fn finalize(
        mut self,
        lm: LanguageModel,
        unknown_dictionary: UnknownDictionary,
        metadata: Metadata,
    ) -> KiwiDictionaryResult<Dictionary> {
        if self.finalized {
            return Err(KiwiDictionaryErrorKind::Args
                .with_error(anyhow::anyhow!("dictionary builder already finalized")));
        }
        self.finalized = true;
        log::debug!(
            "finalizing dictionary: {} forms, {} morphemes, {} combine rules",
            self.forms.len(),
            self.morphemes.len(),
            self.combine_rules.len()
        );

        // Combining stage (c): for each compiled stem+ending fusion rule,
        // wire the mutual `combined` offset so either partial resolves to
        // its fusing sibling via `Morpheme::combined_index`. Morpheme
        // indices are stable from here on (only `FormId`s get remapped
        // below), so these offsets survive the form sort that follows.
        for rule in std::mem::take(&mut self.combine_rules) {
            let stem_idx = rule.stem.0 as usize;
            let ending_idx = rule.ending.0 as usize;
            self.morphemes[stem_idx].combined = ending_idx as i32 - stem_idx as i32;
            self.morphemes[ending_idx].combined = stem_idx as i32 - ending_idx as i32;
        }

        let mut order: Vec<FormId> = (0..self.forms.len() as u32).map(FormId).collect();
        order.sort_by(|a, b| self.forms[a.0 as usize].normalized.cmp(&self.forms[b.0 as usize].normalized));

        let mut remap = vec![FormId(0); self.forms.len()];
        let mut sorted_forms = Vec::with_capacity(self.forms.len());
        for (new_idx, old_id) in order.iter().enumerate() {
            remap[old_id.0 as usize] = FormId(new_idx as u32);
            sorted_forms.push(self.forms[old_id.0 as usize].clone());
        }
        for morpheme in &mut self.morphemes {
            morpheme.surface_form = remap[morpheme.surface_form.0 as usize];
        }

        let patterns: Vec<(String, Vec<AutomatonEntry>)> = sorted_forms
            .iter()
            .enumerate()
            .map(|(idx, form)| {
                (
                    form.normalized.clone(),
                    vec![AutomatonEntry::exact(FormId(idx as u32))],
                )
            })
            .collect();
        let automaton = FormAutomaton::build(patterns)?;

        Ok(Dictionary {
            forms: sorted_forms,
            morphemes: self.morphemes,
            automaton,
            lm,
            unknown_dictionary,
            metadata,
        })
    }
}

const ALL_TAGS: [PosTag; 57] = [
    PosTag::Nng, PosTag::Nnp, PosTag::Nnb, PosTag::Np, PosTag::Nr,
    PosTag::Vv, PosTag::Va, PosTag::VvIrregular, PosTag::VaIrregular, PosTag::Vx, PosTag::Vcp, PosTag::Vcn,
    PosTag::Mm, PosTag::Mag, PosTag::Maj, PosTag::Ic,
    PosTag::Jks, PosTag::Jkc, PosTag::Jkg, PosTag::Jko, PosTag::Jkb, PosTag::Jkv, PosTag::Jkq, PosTag::Jx, PosTag::Jc,
    PosTag::Ep, PosTag::Ef, PosTag::Ec, PosTag::Etn, PosTag::Etm,
    PosTag::Xpn, PosTag::Xsn, PosTag::Xsv, PosTag::Xsa, PosTag::Xr,
    PosTag::Sf, PosTag::Sp, PosTag::Ss, PosTag::Se, PosTag::So, PosTag::Sl, PosTag::Sh, PosTag::Sn,
    PosTag::Nf, PosTag::Nv, PosTag::Na, PosTag::Swk,
    PosTag::WUrl, PosTag::WEmail, PosTag::WHashtag, PosTag::WMention, PosTag::WSerial,
    PosTag::User0, PosTag::User1, PosTag::User2, PosTag::User3, PosTag::User4,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lm::quantize::Codebook;

    fn sample_lm() -> LanguageModel {
        let trie = crate::lm::KnLmTrie::builder()
            .unk_log_prob(-10.0)
            .vocab_size(1024)
            .log_prob_codebook(vec![-1.0])
            .gamma_codebook(vec![0.0])
            .build();
        let _ = Codebook::from_centers(vec![0.0]); // exercised in lm::quantize tests
        LanguageModel::Knlm(trie)
    }

    #[test]
    fn reserved_default_morpheme_range_is_stable() {
        let builder = DictionaryBuilder::new();
        let dict = builder
            .finalize(sample_lm(), UnknownDictionary::default(), Metadata::default())
            .unwrap();
        let id = dict.default_morpheme(PosTag::Vv);
        assert_eq!(dict.morpheme(id).tag, PosTag::Vv);
    }

    #[test]
    fn add_word_then_add_alias_word_shares_lm_token() {
        let mut builder = DictionaryBuilder::new();
        let base = builder.add_word("먹다", PosTag::Vv, 0.0);
        let alias = builder.add_alias_word("먹는다", base).unwrap();
        let dict = builder
            .finalize(sample_lm(), UnknownDictionary::default(), Metadata::default())
            .unwrap();
        assert_eq!(
            dict.morpheme(alias).lm_morpheme_id,
            dict.morpheme(base).lm_morpheme_id
        );
    }

    #[test]
    fn add_alias_word_rejects_unknown_base() {
        let mut builder = DictionaryBuilder::new();
        let bogus = MorphemeId(999_999);
        assert_eq!(
            builder.add_alias_word("x", bogus).unwrap_err().kind(),
            KiwiDictionaryErrorKind::UnknownMorpheme
        );
    }

    #[test]
    fn add_rule_generates_variant_for_every_morpheme_of_tag() {
        let mut builder = DictionaryBuilder::new();
        builder.add_word("먹다", PosTag::Vv, 0.0);
        builder.add_word("가다", PosTag::Vv, 0.0);
        let generated = builder.add_rule(PosTag::Vv, |s| format!("{s}_variant"));
        assert_eq!(generated.len(), 2);
    }

    #[test]
    fn finalize_sorts_forms_by_surface() {
        let mut builder = DictionaryBuilder::new();
        let school = builder.add_word("학교", PosTag::Nng, 0.0);
        let go = builder.add_word("가다", PosTag::Vv, 0.0);
        let dict = builder
            .finalize(sample_lm(), UnknownDictionary::default(), Metadata::default())
            .unwrap();

        let school_form = dict.form(dict.morpheme(school).surface_form).normalized.clone();
        let go_form = dict.form(dict.morpheme(go).surface_form).normalized.clone();
        assert!(go_form < school_form, "가다 should sort before 학교");
        assert_eq!(dict.find_surface_form(&school_form), Some(dict.morpheme(school).surface_form));
    }

    #[test]
    fn load_dictionary_parses_rows() {
        let mut builder = DictionaryBuilder::new();
        let count = builder.load_dictionary("학교,NNG,1.5\n가다,VV,0\n").unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn combine_rule_links_stem_and_ending_to_each_other() {
        let mut builder = DictionaryBuilder::new();
        let stem = builder.add_partial_stem("들", PosTag::VvIrregular, 7, 0.0).unwrap();
        let ending = builder.add_partial_ending("어서", PosTag::Ec, 7, 0.0).unwrap();
        builder.add_combine_rule(stem, ending).unwrap();
        let dict = builder
            .finalize(sample_lm(), UnknownDictionary::default(), Metadata::default())
            .unwrap();

        assert!(dict.morpheme(stem).is_partial());
        assert!(dict.morpheme(ending).is_chunked());
        assert_eq!(dict.morpheme(stem).combined_index(stem.0), Some(ending.0));
        assert_eq!(dict.morpheme(ending).combined_index(ending.0), Some(stem.0));
    }

    #[test]
    fn combine_rule_rejects_mismatched_sockets() {
        let mut builder = DictionaryBuilder::new();
        let stem = builder.add_partial_stem("들", PosTag::VvIrregular, 1, 0.0).unwrap();
        let ending = builder.add_partial_ending("어서", PosTag::Ec, 2, 0.0).unwrap();
        assert_eq!(
            builder.add_combine_rule(stem, ending).unwrap_err().kind(),
            KiwiDictionaryErrorKind::Args
        );
    }

    #[test]
    fn z_coda_and_siot_markers_flip_the_owning_form() {
        let mut builder = DictionaryBuilder::new();
        let word = builder.add_word("그러", PosTag::Ic, 0.0);
        builder.mark_z_coda_appendable(word);
        builder.mark_z_siot_appendable(word);
        let dict = builder
            .finalize(sample_lm(), UnknownDictionary::default(), Metadata::default())
            .unwrap();
        let form = dict.form(dict.morpheme(word).surface_form);
        assert!(form.z_coda_appendable);
        assert!(form.z_siot_appendable);
    }

    #[test]
    fn canonical_morpheme_resolves_aliases_to_their_base() {
        let mut builder = DictionaryBuilder::new();
        let base = builder.add_word("어", PosTag::Ef, 0.0);
        let alias = builder.add_alias_word("여", base).unwrap();
        let dict = builder
            .finalize(sample_lm(), UnknownDictionary::default(), Metadata::default())
            .unwrap();

        assert_eq!(dict.canonical_morpheme(alias), base);
        assert_eq!(dict.canonical_morpheme(base), base);
    }
}
