//! Pre-split of raw input into sentence spans, done lexically (scanning
//! characters) rather than from the lattice/search output: the analyzer
//! needs span boundaries *before* it can build a lattice, so this can't
//! wait for morpheme tags to come back.
//!
//! A sentence ends at a maximal run of strong terminal punctuation
//! (`.`, `!`, `?`, the ellipsis `…`) plus any immediately-following closing
//! quotes/brackets. Any resulting span still longer than `max_len_utf16`
//! UTF-16 units is further cut at the nearest preceding whitespace (a hard
//! cut if none is found), so a single long sentence can't blow up lattice
//! or beam size unboundedly.

use std::ops::Range;

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '…')
}

fn is_closing(c: char) -> bool {
    matches!(c, ')' | ']' | '}' | '"' | '\'' | '”' | '’' | '》' | '」' | '』')
}

/// Splits `text` into non-overlapping, concatenation-preserving byte
/// ranges. `max_len_utf16 == 0` disables the length-based re-split.
pub fn split_sentences(text: &str, max_len_utf16: u32) -> Vec<Range<usize>> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut spans = Vec::new();
    let mut start = 0usize;
    let mut i = 0;
    while i < chars.len() {
        let (_, c) = chars[i];
        if is_terminal(c) {
            let mut j = i + 1;
            while j < chars.len() && is_terminal(chars[j].1) {
                j += 1;
            }
            while j < chars.len() && is_closing(chars[j].1) {
                j += 1;
            }
            let end_byte = if j < chars.len() { chars[j].0 } else { text.len() };
            spans.push(start..end_byte);
            start = end_byte;
            i = j;
            continue;
        }
        i += 1;
    }
    if start < text.len() {
        spans.push(start..text.len());
    }

    let mut bounded = Vec::with_capacity(spans.len());
    for span in spans {
        bound_span(text, span, max_len_utf16, &mut bounded);
    }
    bounded
}

fn bound_span(text: &str, span: Range<usize>, max_len_utf16: u32, out: &mut Vec<Range<usize>>) {
    if max_len_utf16 == 0 {
        out.push(span);
        return;
    }
    let mut cursor = span.start;
    loop {
        let remaining = cursor..span.end;
        let slice = &text[remaining.clone()];
        if slice.encode_utf16().count() as u32 <= max_len_utf16 {
            out.push(remaining);
            break;
        }
        let cut = cursor + safe_cut_point(slice, max_len_utf16);
        if cut <= cursor {
            out.push(remaining);
            break;
        }
        out.push(cursor..cut);
        cursor = cut;
    }
}

/// Byte offset (relative to `slice`) of the nearest whitespace boundary at
/// or before `max_len_utf16` UTF-16 units in, or a hard cut at exactly
/// `max_len_utf16` units if no whitespace is found that early.
fn safe_cut_point(slice: &str, max_len_utf16: u32) -> usize {
    let mut utf16_pos = 0u32;
    let mut last_space_end = None;
    let mut hard_cut = slice.len();
    let mut hard_cut_found = false;
    for (byte_off, c) in slice.char_indices() {
        if utf16_pos >= max_len_utf16 && !hard_cut_found {
            hard_cut = byte_off;
            hard_cut_found = true;
        }
        if c.is_whitespace() && utf16_pos < max_len_utf16 {
            last_space_end = Some(byte_off + c.len_utf8());
        }
        utf16_pos += c.len_utf16() as u32;
    }
    match last_space_end {
        Some(b) if b > 0 => b,
        _ => hard_cut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_after_terminal_punctuation_run() {
        let text = "첫 문장이다. 둘째 문장이다!";
        let spans: Vec<&str> = split_sentences(text, 0).iter().map(|r| &text[r.clone()]).collect();
        assert_eq!(spans, vec!["첫 문장이다. ", "둘째 문장이다!"]);
    }

    #[test]
    fn keeps_trailing_closing_quote_with_its_sentence() {
        let text = "그가 말했다: \"끝났다.\" 다음 문장.";
        let spans: Vec<&str> = split_sentences(text, 0).iter().map(|r| &text[r.clone()]).collect();
        assert_eq!(spans[0], "그가 말했다: \"끝났다.\" ");
    }

    #[test]
    fn no_terminal_punctuation_yields_one_span() {
        let text = "학교에서도 공부한다";
        let spans = split_sentences(text, 0);
        assert_eq!(spans.len(), 1);
        assert_eq!(&text[spans[0].clone()], text);
    }

    #[test]
    fn empty_text_yields_no_spans() {
        assert!(split_sentences("", 50).is_empty());
    }

    #[test]
    fn over_long_sentence_is_re_split_at_whitespace() {
        let text = "aaaa bbbb cccc dddd";
        let spans: Vec<&str> = split_sentences(text, 10).iter().map(|r| &text[r.clone()]).collect();
        assert_eq!(spans, vec!["aaaa bbbb ", "cccc dddd"]);
    }

    #[test]
    fn spans_always_concatenate_back_to_the_original() {
        let text = "문장 하나. 문장 둘은 꽤 길게 써봐요 그래야 재분할 경계를 테스트하니까. 셋!";
        let spans = split_sentences(text, 12);
        let mut rebuilt = String::new();
        for span in &spans {
            rebuilt.push_str(&text[span.clone()]);
        }
        assert_eq!(rebuilt, text);
    }
}
