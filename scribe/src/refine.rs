//! Match refinement
//!
//! A fuzzy matcher may settle on a valid but needlessly scattered set of
//! indices, e.g. taking the first `t` of "this" for the query "tlewas" when
//! "bot[tle] [was]" exists further on. Refinement repeatedly drops the lowest
//! matched index, re-runs the matcher on the text after it, and keeps the
//! attempt with the fewest contiguity breaks.
//!
//! Every attempt starts strictly after the previous attempt's lowest index, so
//! the loop runs at most once per codepoint of the text.

use crate::matcher::{RawMatch, RefinedMatch, TextMatch, TextMatcher};
use crate::tokenizer::{byte_offset, tokenize_query, SearchTerm};

/// Refine `raw` against `query`. The result targets the original text.
pub fn refine<'t>(matcher: &dyn TextMatcher, raw: RawMatch<'t>, query: &str) -> RefinedMatch<'t> {
    let terms = tokenize_query(query);
    if terms.is_empty() {
        return raw;
    }
    refine_terms(matcher, raw, &terms)
}

/// [`refine`] with the query already split into terms.
pub fn refine_terms<'t>(matcher: &dyn TextMatcher, raw: RawMatch<'t>, terms: &[SearchTerm]) -> RefinedMatch<'t> {
    let text = raw.target_text;
    let mut best_breaks = raw.contiguity_breaks();
    let mut current_breaks = best_breaks;
    let mut current_lowest = raw.matched_indices.iter().copied().min();
    let mut best = raw;
    let mut attempts = 0usize;

    while current_breaks > 0 {
        let Some(lowest) = current_lowest else { break };
        let offset = lowest + 1;
        let Some(byte_start) = byte_offset(text, offset) else { break };
        let Some(attempt) = matcher.find_terms(&text[byte_start..], terms) else { break };
        attempts += 1;

        let indices: Vec<usize> = attempt.matched_indices.iter().map(|&i| i + offset).collect();
        let candidate = TextMatch::new(text, attempt.score, indices);
        current_breaks = candidate.contiguity_breaks();
        current_lowest = candidate.matched_indices.iter().copied().min();

        tracing::trace!(offset, breaks = current_breaks, best_breaks, "refinement attempt");

        if current_breaks < best_breaks {
            best_breaks = current_breaks;
            best = candidate;
        }
    }

    if attempts > 0 {
        tracing::trace!(attempts, breaks = best_breaks, "refinement finished");
    }
    best
}
