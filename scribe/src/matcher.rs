//! Fuzzy matcher adapter
//!
//! The pipeline only needs a primitive that, given a text and the query's
//! search terms, returns a score plus the codepoint index of every matched term
//! character. Indices are grouped by term in term order; within a term they
//! ascend. Terms are matched independently, so term groups may appear out of
//! text order.

use std::borrow::Cow;
use std::sync::Arc;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher as _;

use crate::interface::MatcherKind;
use crate::tokenizer::{tokenize_query, SearchTerm};

/// Per-codepoint weight for substring matches; earlier matches lose one point per offset.
const SUBSTRING_CHAR_SCORE: i64 = 16;

/// A match of a query against `target_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch<'t> {
    pub target_text: &'t str,
    pub score: i64,
    pub matched_indices: Vec<usize>,
}

/// Match as produced by a [`TextMatcher`]
pub type RawMatch<'t> = TextMatch<'t>;
/// Match after refinement; same shape, indices made as contiguous as the matcher allows
pub type RefinedMatch<'t> = TextMatch<'t>;

impl<'t> TextMatch<'t> {
    pub fn new(target_text: &'t str, score: i64, matched_indices: Vec<usize>) -> Self {
        Self { target_text, score, matched_indices }
    }

    /// See [`contiguity_breaks`]
    pub fn contiguity_breaks(&self) -> usize {
        contiguity_breaks(&self.matched_indices)
    }

    pub fn is_contiguous(&self) -> bool {
        self.contiguity_breaks() == 0
    }
}

/// Number of adjacent index pairs (in matcher order) that are not consecutive.
pub fn contiguity_breaks(indices: &[usize]) -> usize {
    indices.windows(2).filter(|w| w[1] != w[0] + 1).count()
}

/// An approximate string-matching primitive.
pub trait TextMatcher: Send + Sync {
    /// Match pre-tokenized search terms against `text`. `terms` is never empty.
    fn find_terms<'t>(&self, text: &'t str, terms: &[SearchTerm]) -> Option<RawMatch<'t>>;

    /// Tokenize `query` and match it against `text`.
    fn find<'t>(&self, text: &'t str, query: &str) -> Option<RawMatch<'t>> {
        let terms = tokenize_query(query);
        if terms.is_empty() {
            return None;
        }
        self.find_terms(text, &terms)
    }
}

/// Build the matcher selected by the options
pub fn matcher_for(kind: MatcherKind) -> Arc<dyn TextMatcher> {
    match kind {
        MatcherKind::Fuzzy => Arc::new(SkimTextMatcher::default()),
        MatcherKind::Substring => Arc::new(SubstringMatcher),
    }
}

/// Case-insensitive Skim V2 matching, one pass per term. Scores add up.
///
/// Skim only folds ASCII case, so non-ASCII input is lowercased per codepoint
/// before matching.
pub struct SkimTextMatcher {
    inner: SkimMatcherV2,
}

impl Default for SkimTextMatcher {
    fn default() -> Self {
        Self { inner: SkimMatcherV2::default().ignore_case() }
    }
}

impl TextMatcher for SkimTextMatcher {
    fn find_terms<'t>(&self, text: &'t str, terms: &[SearchTerm]) -> Option<RawMatch<'t>> {
        let folded = fold_case(text);
        let mut score = 0i64;
        let mut indices = Vec::with_capacity(terms.iter().map(SearchTerm::len).sum());
        for term in terms {
            let (term_score, term_indices) = self.inner.fuzzy_indices(&folded, &fold_case(&term.text))?;
            if term_indices.len() != term.len() {
                return None;
            }
            score += term_score;
            indices.extend(term_indices);
        }
        Some(TextMatch::new(text, score, indices))
    }
}

/// Lowercase `s` one codepoint at a time. A codepoint whose lowercase form is
/// not a single codepoint is kept as is, so codepoint offsets are unchanged.
fn fold_case(s: &str) -> Cow<'_, str> {
    if s.is_ascii() {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.chars()
            .map(|c| {
                let mut lower = c.to_lowercase();
                match (lower.next(), lower.next()) {
                    (Some(l), None) => l,
                    _ => c,
                }
            })
            .collect(),
    )
}

/// First case-insensitive contiguous occurrence of each term.
pub struct SubstringMatcher;

impl TextMatcher for SubstringMatcher {
    fn find_terms<'t>(&self, text: &'t str, terms: &[SearchTerm]) -> Option<RawMatch<'t>> {
        let chars: Vec<char> = text.chars().collect();
        let mut score = 0i64;
        let mut indices = Vec::with_capacity(terms.iter().map(SearchTerm::len).sum());
        for term in terms {
            let start = find_ignore_case(&chars, &term.codepoints)?;
            score += term.len() as i64 * SUBSTRING_CHAR_SCORE - start as i64;
            indices.extend(start..start + term.len());
        }
        Some(TextMatch::new(text, score, indices))
    }
}

fn find_ignore_case(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).find(|&start| {
        haystack[start..start + needle.len()]
            .iter()
            .zip(needle)
            .all(|(&a, &b)| chars_eq_ignore_case(a, b))
    })
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
