//! Scribe Interface Definition
//!
//! Records, enums, options and the error type shared between the search
//! pipeline and the rendering layer that consumes it. This file is the source
//! of truth for everything that crosses the library boundary.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMS
// ═══════════════════════════════════════════════════════════════════════════════

/// Approximate-matching primitive that drives the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    /// Skim V2 scoring: in-order subsequence with contiguity and word-start bonuses
    #[default]
    Fuzzy,
    /// Case-insensitive contiguous match per search term
    Substring,
}

/// Ordering used when navigating a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrder {
    /// Descending score, ties by ascending id
    #[default]
    Relevance,
    /// Ascending id (transcript order)
    Chronological,
}

/// Normalized transcript content.
///
/// Plain items are bare strings; timed items are cues with begin/end in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemContent {
    Plain { text: String },
    Timed { text: String, begin: f64, end: f64 },
}

impl ItemContent {
    /// The searchable text
    pub fn text(&self) -> &str {
        match self {
            ItemContent::Plain { text } => text,
            ItemContent::Timed { text, .. } => text,
        }
    }

    /// `(begin, end)` for timed cues
    pub fn span(&self) -> Option<(f64, f64)> {
        match self {
            ItemContent::Plain { .. } => None,
            ItemContent::Timed { begin, end, .. } => Some((*begin, *end)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// INPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// A transcript item as supplied by the caller: either a bare string or a
/// structured cue. Unknown fields on structured cues are kept in `extra` and
/// handed back untouched on the normalized item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranscriptInput {
    Plain(String),
    Structured(StructuredInput),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredInput {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub begin: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl From<&str> for TranscriptInput {
    fn from(text: &str) -> Self {
        TranscriptInput::Plain(text.to_string())
    }
}

impl From<String> for TranscriptInput {
    fn from(text: String) -> Self {
        TranscriptInput::Plain(text)
    }
}

impl From<StructuredInput> for TranscriptInput {
    fn from(input: StructuredInput) -> Self {
        TranscriptInput::Structured(input)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS (Structs)
// ═══════════════════════════════════════════════════════════════════════════════

/// A normalized transcript item. `id` is its position in the item set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptItem {
    pub id: u64,
    pub content: ItemContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TranscriptItem {
    pub fn text(&self) -> &str {
        self.content.text()
    }
}

/// A highlighted run of matched codepoints, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRange {
    pub start: usize,
    pub end: usize,
}

/// One item that survived matching, refinement and validation.
///
/// `highlighted_chunks` alternates unmatched/matched text: even positions are
/// plain, odd positions are matches. `highlight_ranges` holds the same matches
/// as codepoint ranges into the item text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub id: u64,
    pub item: TranscriptItem,
    pub score: i64,
    pub highlighted_chunks: Vec<String>,
    pub highlight_ranges: Vec<HighlightRange>,
}

impl MatchResult {
    /// Rebuild the item text with every matched chunk wrapped in `open`/`close`.
    pub fn marked_text(&self, open: &str, close: &str) -> String {
        let mut out = String::with_capacity(self.item.text().len() + self.highlight_ranges.len() * (open.len() + close.len()));
        for (i, chunk) in self.highlighted_chunks.iter().enumerate() {
            if i % 2 == 1 {
                out.push_str(open);
                out.push_str(chunk);
                out.push_str(close);
            } else {
                out.push_str(chunk);
            }
        }
        out
    }
}

/// Result of one search invocation.
///
/// Every id in either id list has an entry in `results_by_id`.
/// `ids_chronological` is `ids_by_relevance` sorted ascending.
/// `query` is `None` when no search is active, which keeps "nothing searched"
/// apart from "searched, nothing found".
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchResultSet {
    pub query: Option<String>,
    pub results_by_id: BTreeMap<u64, MatchResult>,
    pub ids_by_relevance: Vec<u64>,
    pub ids_chronological: Vec<u64>,
}

impl SearchResultSet {
    /// The inactive result set
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.query.is_some()
    }

    pub fn len(&self) -> usize {
        self.ids_by_relevance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids_by_relevance.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&MatchResult> {
        self.results_by_id.get(&id)
    }

    pub fn ids(&self, order: ResultOrder) -> &[u64] {
        match order {
            ResultOrder::Relevance => &self.ids_by_relevance,
            ResultOrder::Chronological => &self.ids_chronological,
        }
    }

    /// 1-based position of `id` and the total count, for "N of M" indicators.
    pub fn position(&self, id: u64, order: ResultOrder) -> Option<(usize, usize)> {
        let ids = self.ids(order);
        ids.iter().position(|&i| i == id).map(|p| (p + 1, ids.len()))
    }

    /// The id after `current`, wrapping to the first. An unknown or missing
    /// `current` yields the first id.
    pub fn next_id(&self, current: Option<u64>, order: ResultOrder) -> Option<u64> {
        let ids = self.ids(order);
        let first = *ids.first()?;
        match current.and_then(|c| ids.iter().position(|&i| i == c)) {
            Some(p) => Some(ids[(p + 1) % ids.len()]),
            None => Some(first),
        }
    }

    /// The id before `current`, wrapping to the last. An unknown or missing
    /// `current` yields the last id.
    pub fn previous_id(&self, current: Option<u64>, order: ResultOrder) -> Option<u64> {
        let ids = self.ids(order);
        let last = *ids.last()?;
        match current.and_then(|c| ids.iter().position(|&i| i == c)) {
            Some(0) => Some(last),
            Some(p) => Some(ids[p - 1]),
            None => Some(last),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Pipeline configuration. Missing fields take their defaults when
/// deserialized, so `{}` is a valid options document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub matcher: MatcherKind,
    /// Raw matches scoring below this are dropped before refinement
    pub min_score: Option<i64>,
    pub refine: bool,
    pub validate: bool,
    /// Cap on matches kept; `0` is treated as `1`
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            matcher: MatcherKind::Fuzzy,
            min_score: None,
            refine: true,
            validate: true,
            max_results: crate::search::MAX_RESULTS,
        }
    }
}

impl SearchOptions {
    /// Reject options the pipeline cannot honor.
    pub fn check(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::InvalidInput("max_results must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Number of matches a pass keeps
    pub fn result_limit(&self) -> usize {
        self.max_results.max(1)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Error type for Scribe operations
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Offset {offset} lies outside the tokenized text ({len} codepoints)")]
    OffsetOutOfRange { offset: usize, len: usize },
    #[error("Malformed match: {0}")]
    MalformedMatch(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Search task failed: {0}")]
    TaskFailed(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// SERVICE INTERFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// The interface a rendering layer drives. Matches the functionality exposed
/// by [`crate::TranscriptSearcher`].
#[async_trait::async_trait]
pub trait TranscriptSearchApi: Send + Sync {
    /// Run a search against the current item set. Returns the applied result
    /// set, or `None` when a newer invocation superseded this one.
    async fn search(&self, query: Option<String>) -> Result<Option<Arc<SearchResultSet>>, SearchError>;

    /// Replace the item set. Returns `false` when the content is unchanged.
    fn set_items(&self, items: Vec<TranscriptInput>) -> bool;

    /// Enable or disable searching. Disabling clears the visible results.
    fn set_enabled(&self, enabled: bool);

    /// The most recently applied result set
    fn results(&self) -> Arc<SearchResultSet>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_set(ids: &[u64]) -> SearchResultSet {
        let mut chronological = ids.to_vec();
        chronological.sort_unstable();
        let results_by_id = ids
            .iter()
            .map(|&id| {
                let item = TranscriptItem {
                    id,
                    content: ItemContent::Plain { text: format!("item {id}") },
                    speaker: None,
                    extra: serde_json::Map::new(),
                };
                (id, MatchResult { id, item, score: 0, highlighted_chunks: vec![format!("item {id}")], highlight_ranges: vec![] })
            })
            .collect();
        SearchResultSet {
            query: Some("item".to_string()),
            results_by_id,
            ids_by_relevance: ids.to_vec(),
            ids_chronological: chronological,
        }
    }

    #[test]
    fn test_empty_set_is_inactive() {
        let set = SearchResultSet::empty();
        assert!(!set.is_active());
        assert!(set.is_empty());
        assert_eq!(set.next_id(None, ResultOrder::Relevance), None);
    }

    #[test]
    fn test_position_reports_n_of_m() {
        let set = result_set(&[4, 1, 7]);
        assert_eq!(set.position(1, ResultOrder::Relevance), Some((2, 3)));
        assert_eq!(set.position(1, ResultOrder::Chronological), Some((1, 3)));
        assert_eq!(set.position(9, ResultOrder::Relevance), None);
    }

    #[test]
    fn test_navigation_wraps() {
        let set = result_set(&[4, 1, 7]);
        assert_eq!(set.next_id(None, ResultOrder::Relevance), Some(4));
        assert_eq!(set.next_id(Some(7), ResultOrder::Relevance), Some(4));
        assert_eq!(set.previous_id(Some(4), ResultOrder::Relevance), Some(7));
        assert_eq!(set.previous_id(Some(7), ResultOrder::Chronological), Some(4));
        assert_eq!(set.previous_id(Some(99), ResultOrder::Chronological), Some(7));
    }

    #[test]
    fn test_marked_text_wraps_odd_chunks() {
        let item = TranscriptItem {
            id: 0,
            content: ItemContent::Plain { text: "hello world".to_string() },
            speaker: None,
            extra: serde_json::Map::new(),
        };
        let m = MatchResult {
            id: 0,
            item,
            score: 1,
            highlighted_chunks: vec!["".into(), "he".into(), "llo ".into(), "wo".into(), "rld".into()],
            highlight_ranges: vec![HighlightRange { start: 0, end: 2 }, HighlightRange { start: 6, end: 8 }],
        };
        assert_eq!(m.marked_text("<b>", "</b>"), "<b>he</b>llo <b>wo</b>rld");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let opts: SearchOptions = serde_json::from_str(r#"{"matcher": "substring"}"#).unwrap();
        assert_eq!(opts.matcher, MatcherKind::Substring);
        assert!(opts.refine);
        assert!(opts.validate);
        assert_eq!(opts.max_results, crate::search::MAX_RESULTS);
        assert!(opts.check().is_ok());

        let opts: SearchOptions = serde_json::from_str(r#"{"max_results": 0}"#).unwrap();
        assert!(matches!(opts.check(), Err(SearchError::InvalidInput(_))));
        assert_eq!(opts.result_limit(), 1);
    }

    #[test]
    fn test_input_accepts_strings_and_objects() {
        let items: Vec<TranscriptInput> = serde_json::from_str(
            r#"["plain line", {"text": "timed", "begin": 1.5, "end": 3.0, "speaker": "Alice", "format": "text/plain"}]"#,
        )
        .unwrap();
        assert_eq!(items[0], TranscriptInput::Plain("plain line".to_string()));
        match &items[1] {
            TranscriptInput::Structured(s) => {
                assert_eq!(s.text.as_deref(), Some("timed"));
                assert_eq!(s.begin, Some(1.5));
                assert_eq!(s.speaker.as_deref(), Some("Alice"));
                assert_eq!(s.extra.get("format").and_then(|v| v.as_str()), Some("text/plain"));
            }
            other => panic!("expected structured input, got {other:?}"),
        }
    }
}
