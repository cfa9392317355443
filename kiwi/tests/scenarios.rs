//! End-to-end scenarios over a small hand-built dictionary and a flat
//! language model, covering the literal analysis examples and a few of
//! the cross-cutting properties (monotone ranking, determinism,
//! blocklist respect).

use kiwi::{AnalysisResult, AnalyzeRequest, Analyzer, AnalyzerBuilder, PosTag};
use kiwi_dictionary::dictionary::{Dictionary, DictionaryBuilder};
use kiwi_dictionary::lm::{KnLmTrie, LanguageModel};
use kiwi_dictionary::metadata::Metadata;
use kiwi_dictionary::unknown_dictionary::UnknownDictionary;

/// Every known token scores identically under this model (no children are
/// ever registered, so `advance` always falls through to the unknown-token
/// back-off at the root) — disambiguation in these tests comes entirely
/// from which dictionary entries cover the input, not from LM shape.
fn build_flat_lm() -> LanguageModel {
    let mut builder = KnLmTrie::builder()
        .unk_log_prob(-1.0)
        .vocab_size(4096)
        .log_prob_codebook(vec![-1.0])
        .gamma_codebook(vec![0.0]);
    builder.push_node(0, 0, 0);
    LanguageModel::Knlm(builder.build())
}

fn build_test_dictionary() -> (Dictionary, kiwi_dictionary::MorphemeId) {
    let mut builder = DictionaryBuilder::new();

    // "학교에서도" -> 학교/NNG, 에서/JKB, 도/JX
    builder.add_word("학교", PosTag::Nng, 0.0);
    builder.add_word("에서", PosTag::Jkb, 0.0);
    builder.add_word("도", PosTag::Jx, 0.0);

    // "먹었다" -> 먹/VV, 었/EP, 다/EF
    let meok = builder.add_word("먹", PosTag::Vv, 0.0);
    let eot = builder.add_word("었", PosTag::Ep, 0.0);
    let da = builder.add_word("다", PosTag::Ef, 0.0);

    // "사겼다" (irregular conjugation of 사귀다+었다) -> 사귀/VV, 었/EP, 다/EF
    let sagwi = builder.add_word("사귀", PosTag::Vv, 0.0);
    builder
        .add_pre_analyzed_word("사겼다", PosTag::Vv, &[(sagwi, "사귀"), (eot, "었"), (da, "다")])
        .expect("chunk morphemes were just registered above");

    // "https://kiwi.io 좋아요!" -> URL pattern, 좋/VA, 아요/EF, !/SF
    builder.add_word("좋", PosTag::Va, 0.0);
    builder.add_word("아요", PosTag::Ef, 0.0);
    builder.add_word("!", PosTag::Sf, 0.0);

    let dict = builder
        .finalize(build_flat_lm(), UnknownDictionary::default(), Metadata::default())
        .expect("a builder that hasn't been finalized yet always finalizes");
    (dict, meok)
}

fn build_test_analyzer() -> Analyzer {
    AnalyzerBuilder::new().build_from_dictionary(build_test_dictionary().0)
}

fn analyze_one<'a>(analyzer: &Analyzer, text: &'a str) -> AnalysisResult<'a> {
    let request = AnalyzeRequest::new(text);
    let mut results = analyzer
        .analyze(&request)
        .expect("analysis should not error on well-formed input");
    assert!(!results.is_empty(), "expected at least one candidate analysis");
    results.remove(0)
}

fn tags(result: &AnalysisResult) -> Vec<PosTag> {
    result.tokens.iter().map(|t| t.tag).collect()
}

fn surfaces<'a>(result: &'a AnalysisResult) -> Vec<&'a str> {
    result.tokens.iter().map(|t| t.surface.as_ref()).collect()
}

#[test]
fn s1_school_location_topic_chain() {
    let analyzer = build_test_analyzer();
    let result = analyze_one(&analyzer, "학교에서도");
    assert_eq!(tags(&result), vec![PosTag::Nng, PosTag::Jkb, PosTag::Jx]);
    assert_eq!(surfaces(&result), vec!["학교", "에서", "도"]);
}

#[test]
fn s2_verb_past_ending() {
    let analyzer = build_test_analyzer();
    let result = analyze_one(&analyzer, "먹었다");
    assert_eq!(tags(&result), vec![PosTag::Vv, PosTag::Ep, PosTag::Ef]);
    assert_eq!(surfaces(&result), vec!["먹", "었", "다"]);
}

#[test]
fn s3_pre_analyzed_irregular_conjugation_expands_to_chunks() {
    let analyzer = build_test_analyzer();
    let result = analyze_one(&analyzer, "사겼다");
    // One token per chunk, carrying the regular-conjugation lemma's tag
    // sequence even though the surface retains the contracted spelling.
    assert_eq!(tags(&result), vec![PosTag::Vv, PosTag::Ep, PosTag::Ef]);
    assert_eq!(result.tokens.len(), 3);
}

#[test]
fn s4_url_pattern_then_known_words_and_punctuation() {
    let analyzer = build_test_analyzer();
    let result = analyze_one(&analyzer, "https://kiwi.io 좋아요!");
    assert_eq!(
        tags(&result),
        vec![PosTag::WUrl, PosTag::Va, PosTag::Ef, PosTag::Sf]
    );
    assert_eq!(surfaces(&result), vec!["https://kiwi.io", "좋", "아요", "!"]);
}

#[test]
fn s5_repeated_char_run_becomes_one_pattern_token() {
    let analyzer = build_test_analyzer();
    let result = analyze_one(&analyzer, "ㅋㅋㅋ");
    assert_eq!(result.tokens.len(), 1);
    assert_eq!(result.tokens[0].tag, PosTag::Swk);
    assert_eq!(result.tokens[0].surface.as_ref(), "ㅋㅋㅋ");
}

#[test]
fn s6_empty_input_yields_no_tokens() {
    let analyzer = build_test_analyzer();
    let result = analyze_one(&analyzer, "");
    assert!(result.tokens.is_empty());
    assert_eq!(result.score, 0.0);
}

#[test]
fn s7_combine_socket_fuses_partial_stem_and_ending() {
    // A stem+ending fusion pair that never appears as a single pre-analyzed
    // word: the combine-socket gate (not chunked pre-analysis) is what
    // keeps the ending from matching unless a partial stem on the same
    // socket has just been seen.
    let mut builder = DictionaryBuilder::new();
    let stem = builder.add_partial_stem("하", PosTag::VvIrregular, 5, 0.0).unwrap();
    let ending = builder.add_partial_ending("지요", PosTag::Ec, 5, 0.0).unwrap();
    builder.add_combine_rule(stem, ending).unwrap();
    let dict = builder
        .finalize(build_flat_lm(), UnknownDictionary::default(), Metadata::default())
        .unwrap();
    let analyzer = AnalyzerBuilder::new().build_from_dictionary(dict);

    let result = analyze_one(&analyzer, "하지요");
    assert_eq!(tags(&result), vec![PosTag::VvIrregular, PosTag::Ec]);
    assert_eq!(surfaces(&result), vec!["하", "지요"]);
}

#[test]
fn ranking_is_monotone_non_increasing() {
    let analyzer = build_test_analyzer();
    let request = AnalyzeRequest {
        top_n: 3,
        ..AnalyzeRequest::new("학교에서도")
    };
    let results = analyzer.analyze(&request).unwrap();
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn repeated_analysis_is_deterministic() {
    let analyzer = build_test_analyzer();
    let first = analyze_one(&analyzer, "먹었다");
    let second = analyze_one(&analyzer, "먹었다");
    assert_eq!(tags(&first), tags(&second));
    assert_eq!(surfaces(&first), surfaces(&second));
    assert_eq!(first.score, second.score);
}

#[test]
fn blocklist_excludes_a_morpheme_not_on_the_winning_path() {
    let (dict, meok) = build_test_dictionary();
    // Block the verb-stem morpheme ("먹") while analyzing a sentence that
    // never uses it; the winning path must be unaffected.
    let analyzer = AnalyzerBuilder::new().build_from_dictionary(dict);
    let blocklist = vec![meok];
    let request = AnalyzeRequest {
        blocklist: &blocklist,
        ..AnalyzeRequest::new("학교에서도")
    };
    let results = analyzer.analyze(&request).unwrap();
    assert!(!results.is_empty());
    assert_eq!(tags(&results[0]), vec![PosTag::Nng, PosTag::Jkb, PosTag::Jx]);
    for token in &results[0].tokens {
        assert_ne!(token.morpheme, meok);
    }
}
