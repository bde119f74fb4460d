//! Match validation
//!
//! Fuzzy matching tolerates typos inside a word, but a search term must not be
//! stitched together from unrelated words. Matched indices are mapped back to
//! tokens per search term; a term spanning several tokens is accepted only when
//! it consumes the tail of each token it leaves, enters each following token at
//! its first character, and never jumps over an unmatched word.

use crate::interface::SearchError;
use crate::matcher::TextMatch;
use crate::tokenizer::{find_token_index, tokenize, tokenize_query, SearchTerm, Token};

/// Matched indices of one search term and the token each index landed in.
/// `matched_tokens[i]` contains `matched_indices[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTermMatch<'a> {
    pub term: &'a SearchTerm,
    pub matched_tokens: Vec<&'a Token>,
    pub matched_indices: Vec<usize>,
}

impl<'a> SearchTermMatch<'a> {
    /// Matched tokens with consecutive repeats collapsed
    pub fn distinct_tokens(&self) -> Vec<&'a Token> {
        let mut out: Vec<&'a Token> = Vec::new();
        for &token in &self.matched_tokens {
            if out.last().map_or(true, |last| last.sequence_index != token.sequence_index) {
                out.push(token);
            }
        }
        out
    }

    /// `(token, first matched offset, last matched offset)` per run of indices in one token.
    fn token_runs(&self) -> Vec<(&'a Token, usize, usize)> {
        let mut runs: Vec<(&'a Token, usize, usize)> = Vec::new();
        for (&token, &idx) in self.matched_tokens.iter().zip(&self.matched_indices) {
            match runs.last_mut() {
                Some(run) if run.0.sequence_index == token.sequence_index => run.2 = idx,
                _ => runs.push((token, idx, idx)),
            }
        }
        runs
    }
}

/// Associate matched indices with search terms and tokens.
///
/// Indices are consumed in matcher order, `term.len()` word-token indices per
/// term. Indices landing in whitespace or punctuation are skipped. Running out
/// of indices, or word indices left over after the last term, is an error.
pub fn link_terms_to_tokens<'a>(
    tokens: &'a [Token],
    terms: &'a [SearchTerm],
    indices: &[usize],
) -> Result<Vec<SearchTermMatch<'a>>, SearchError> {
    let mut cursor = indices.iter().copied();
    let mut linked = Vec::with_capacity(terms.len());

    for term in terms {
        let mut term_match = SearchTermMatch {
            term,
            matched_tokens: Vec::with_capacity(term.len()),
            matched_indices: Vec::with_capacity(term.len()),
        };
        while term_match.matched_indices.len() < term.len() {
            let Some(idx) = cursor.next() else {
                return Err(SearchError::MalformedMatch(format!(
                    "ran out of matched indices for term {:?}",
                    term.text
                )));
            };
            let token = &tokens[find_token_index(tokens, idx)?];
            if !token.is_word() {
                continue;
            }
            term_match.matched_tokens.push(token);
            term_match.matched_indices.push(idx);
        }
        linked.push(term_match);
    }

    for idx in cursor {
        if tokens[find_token_index(tokens, idx)?].is_word() {
            return Err(SearchError::MalformedMatch(format!(
                "matched index {idx} is not claimed by any search term"
            )));
        }
    }

    Ok(linked)
}

/// Whether one term's indices respect word boundaries.
pub fn term_match_is_valid(tokens: &[Token], term_match: &SearchTermMatch<'_>) -> bool {
    let runs = term_match.token_runs();
    runs.windows(2).all(|pair| {
        let (left, _, left_last) = pair[0];
        let (right, right_first, _) = pair[1];
        if right.sequence_index <= left.sequence_index {
            return false;
        }
        if left_last != left.last_offset() || right_first != right.start_offset {
            return false;
        }
        !tokens[left.sequence_index + 1..right.sequence_index]
            .iter()
            .any(Token::is_word)
    })
}

/// Validate a match against its query.
pub fn validate(m: &TextMatch<'_>, query: &str) -> Result<bool, SearchError> {
    let tokens = tokenize(m.target_text);
    let terms = tokenize_query(query);
    validate_terms(&tokens, &terms, m)
}

/// [`validate`] with the target text and query already tokenized.
pub fn validate_terms(tokens: &[Token], terms: &[SearchTerm], m: &TextMatch<'_>) -> Result<bool, SearchError> {
    if terms.is_empty() {
        return Ok(false);
    }
    let linked = link_terms_to_tokens(tokens, terms, &m.matched_indices)?;
    Ok(linked.iter().all(|tm| term_match_is_valid(tokens, tm)))
}
