//! Result highlighting
//!
//! Turns a match into alternating unmatched/matched chunks of the target text.
//! Even chunk positions are unmatched, odd positions matched; adjacent matched
//! indices coalesce into one chunk. Out-of-range indices are ignored.

use crate::interface::HighlightRange;
use crate::matcher::TextMatch;
use crate::tokenizer::codepoint_len;

/// Coalesce matched indices into sorted, non-overlapping codepoint ranges.
pub fn indices_to_ranges(indices: &[usize]) -> Vec<HighlightRange> {
    if indices.is_empty() {
        return Vec::new();
    }

    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let first = HighlightRange { start: sorted[0], end: sorted[0] + 1 };
    sorted[1..].iter().fold(vec![first], |mut acc, &idx| {
        match acc.last_mut() {
            Some(last) if idx == last.end => last.end = idx + 1,
            _ => acc.push(HighlightRange { start: idx, end: idx + 1 }),
        }
        acc
    })
}

/// Matched ranges of `m`, clipped to its text.
pub fn highlight_ranges(m: &TextMatch<'_>) -> Vec<HighlightRange> {
    let len = codepoint_len(m.target_text);
    indices_to_ranges(&m.matched_indices)
        .into_iter()
        .filter(|r| r.start < len)
        .map(|r| HighlightRange { start: r.start, end: r.end.min(len) })
        .collect()
}

/// Split `m.target_text` into alternating unmatched/matched chunks.
pub fn highlight(m: &TextMatch<'_>) -> Vec<String> {
    chunks_from_ranges(m.target_text, &highlight_ranges(m))
}

/// Split `text` around sorted, non-overlapping `ranges`.
///
/// With no ranges the whole text is the single chunk. No empty chunk is
/// appended after a match that ends the text.
pub fn chunks_from_ranges(text: &str, ranges: &[HighlightRange]) -> Vec<String> {
    if ranges.is_empty() {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::with_capacity(ranges.len() * 2 + 1);
    let mut cursor = 0;
    for range in ranges {
        let start = range.start.clamp(cursor, chars.len());
        let end = range.end.clamp(start, chars.len());
        chunks.push(chars[cursor..start].iter().collect());
        chunks.push(chars[start..end].iter().collect());
        cursor = end;
    }
    if cursor < chars.len() {
        chunks.push(chars[cursor..].iter().collect());
    }
    chunks
}
