//! Scribe - fuzzy search and highlighting over transcripts
//!
//! Matches a free-text query against every item of a transcript, repairs
//! fragmented fuzzy matches, rejects matches that stitch a search term together
//! from unrelated words, and splits each surviving item into highlight chunks.
//!
//! [`search_items`] runs one synchronous pass; [`TranscriptSearcher`] keeps an
//! item set and runs cancellable passes for an interactive caller.

pub(crate) mod candidate;
pub mod highlight;
pub mod interface;
pub mod matcher;
pub mod models;
pub mod refine;
pub mod search;
mod store;
pub mod tokenizer;
pub mod validate;

pub use interface::*;
pub use matcher::{RawMatch, RefinedMatch, SkimTextMatcher, SubstringMatcher, TextMatch, TextMatcher};
pub use search::{search_items, search_items_with};
pub use store::TranscriptSearcher;
pub use tokenizer::{SearchTerm, Token, TokenKind};
