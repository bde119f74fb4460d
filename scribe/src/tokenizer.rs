//! Text and query tokenization
//!
//! `tokenize` partitions text into maximal runs of one character class
//! (word, whitespace, other). Offsets are codepoint offsets, never byte or
//! UTF-16 offsets, so matcher indices can be mapped back onto tokens directly.
//!
//! `tokenize_query` folds a query's tokens into search terms: whitespace
//! separates terms, other-class characters (apostrophes, hyphens) are dropped
//! and glue the surrounding word runs into a single term.

use crate::interface::SearchError;

/// Character class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Unicode letters and decimal digits
    Word,
    Whitespace,
    /// Punctuation, symbols, emoji
    Other,
}

impl TokenKind {
    pub fn of(c: char) -> Self {
        if c.is_alphabetic() || c.is_ascii_digit() {
            TokenKind::Word
        } else if c.is_whitespace() {
            TokenKind::Whitespace
        } else {
            TokenKind::Other
        }
    }
}

/// A maximal run of same-class codepoints. `end_offset` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub codepoints: Vec<char>,
    pub start_offset: usize,
    pub end_offset: usize,
    /// Position among all tokens of the text
    pub sequence_index: usize,
}

impl Token {
    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    /// Offset of the last codepoint in the token
    pub fn last_offset(&self) -> usize {
        self.end_offset - 1
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start_offset <= offset && offset < self.end_offset
    }
}

/// One whitespace-delimited unit of a query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchTerm {
    pub text: String,
    pub codepoints: Vec<char>,
}

impl SearchTerm {
    /// Number of matched indices this term consumes
    pub fn len(&self) -> usize {
        self.codepoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codepoints.is_empty()
    }
}

/// Split `text` into classified, contiguous, non-overlapping tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let start = i;
        let kind = TokenKind::of(chars[i]);
        while i < chars.len() && TokenKind::of(chars[i]) == kind {
            i += 1;
        }
        let codepoints = chars[start..i].to_vec();
        tokens.push(Token {
            kind,
            text: codepoints.iter().collect(),
            codepoints,
            start_offset: start,
            end_offset: i,
            sequence_index: tokens.len(),
        });
    }
    tokens
}

/// Split a query into search terms.
///
/// Whitespace-only queries produce no terms, and neither do terms made only of
/// other-class characters.
pub fn tokenize_query(query: &str) -> Vec<SearchTerm> {
    let mut terms = Vec::new();
    let mut current = SearchTerm::default();
    for token in tokenize(query) {
        match token.kind {
            TokenKind::Whitespace => {
                if !current.is_empty() {
                    terms.push(std::mem::take(&mut current));
                }
            }
            TokenKind::Word => {
                current.text.push_str(&token.text);
                current.codepoints.extend_from_slice(&token.codepoints);
            }
            TokenKind::Other => {}
        }
    }
    if !current.is_empty() {
        terms.push(current);
    }
    terms
}

/// Binary-search the token containing codepoint `offset`.
///
/// Tokens must come from a single `tokenize` call. An offset past the end of
/// the text means the caller mixed up texts and is reported as an error.
pub fn find_token_index(tokens: &[Token], offset: usize) -> Result<usize, SearchError> {
    let mut lo = 0;
    let mut hi = tokens.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let token = &tokens[mid];
        if offset < token.start_offset {
            hi = mid;
        } else if offset >= token.end_offset {
            lo = mid + 1;
        } else {
            return Ok(mid);
        }
    }
    Err(SearchError::OffsetOutOfRange {
        offset,
        len: tokens.last().map_or(0, |t| t.end_offset),
    })
}

/// Number of codepoints in `text`
pub(crate) fn codepoint_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of codepoint `offset`, or `None` when it lies at or past the end.
pub(crate) fn byte_offset(text: &str, offset: usize) -> Option<usize> {
    text.char_indices().nth(offset).map(|(b, _)| b)
}
