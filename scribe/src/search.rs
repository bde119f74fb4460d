//! Search pass (match → refine → validate → highlight, per item)
//!
//! Every item is matched independently on the rayon pool. Each candidate is
//! refined toward a contiguous match, checked against word boundaries, and
//! split into highlight chunks. Survivors are ordered by descending score with
//! ascending id breaking ties; the chronological order is the same ids sorted.
//! The pass checks its cancellation token between items and reports
//! `Cancelled` instead of a partial result.

use std::collections::BTreeMap;
use std::sync::Once;

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::candidate::{Corpus, PreparedItem};
use crate::highlight::{chunks_from_ranges, highlight_ranges};
use crate::interface::{MatchResult, SearchError, SearchOptions, SearchResultSet, TranscriptInput};
use crate::matcher::{matcher_for, TextMatcher};
use crate::refine::refine_terms;
use crate::tokenizer::{tokenize_query, SearchTerm};
use crate::validate::validate_terms;

/// Maximum results kept per search.
pub(crate) const MAX_RESULTS: usize = 2000;

static RAYON_INIT: Once = Once::new();

/// Initialize the global rayon pool with lowered thread priority. At least two
/// workers, so one long-running item cannot starve a newer pass.
pub(crate) fn init_rayon() {
    RAYON_INIT.call_once(|| {
        let num_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        // Leave room for the tokio workers that drive the searcher.
        let rayon_threads = num_threads.saturating_sub(2).max(2);

        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(rayon_threads)
            .thread_name(|i| format!("scribe-rayon-{}", i))
            .start_handler(|_| {
                use thread_priority::*;
                let _ = set_current_thread_priority(ThreadPriority::Min);
            })
            .build_global();
    });
}

/// Whether `query` starts a search at all
pub fn is_blank_query(query: Option<&str>) -> bool {
    query.map_or(true, |q| tokenize_query(q).is_empty())
}

/// Search plain or structured items with default options.
///
/// A missing or blank query, or an empty item set, yields the inactive
/// [`SearchResultSet::empty`].
pub fn search_items(query: Option<&str>, items: &[TranscriptInput]) -> SearchResultSet {
    search_items_with(query, items, &SearchOptions::default())
}

/// [`search_items`] with explicit options.
pub fn search_items_with(query: Option<&str>, items: &[TranscriptInput], options: &SearchOptions) -> SearchResultSet {
    let corpus = Corpus::from_inputs(items);
    let matcher = matcher_for(options.matcher);
    let token = CancellationToken::new();
    // a private token is never cancelled
    search_corpus(&corpus, query, matcher.as_ref(), options, &token).unwrap_or_default()
}

/// Run one search pass over a prepared corpus.
pub(crate) fn search_corpus(
    corpus: &Corpus,
    query: Option<&str>,
    matcher: &dyn TextMatcher,
    options: &SearchOptions,
    token: &CancellationToken,
) -> Result<SearchResultSet, SearchError> {
    if token.is_cancelled() {
        return Err(SearchError::Cancelled);
    }
    let Some(query) = query else {
        return Ok(SearchResultSet::empty());
    };
    let terms = tokenize_query(query);
    if terms.is_empty() || corpus.is_empty() {
        return Ok(SearchResultSet::empty());
    }

    init_rayon();

    #[cfg(feature = "perf-log")]
    let t0 = std::time::Instant::now();

    let mut matches: Vec<MatchResult> = corpus
        .items()
        .par_iter()
        .take_any_while(|_| !token.is_cancelled())
        .filter_map(|prepared| match match_item(prepared, &terms, matcher, options) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(item = prepared.item().id, error = %e, "dropping malformed match");
                None
            }
        })
        .collect();

    // take_any_while stops early without telling us; never hand out a partial set
    if token.is_cancelled() {
        return Err(SearchError::Cancelled);
    }

    #[cfg(feature = "perf-log")]
    let t1 = std::time::Instant::now();

    matches.sort_unstable_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
    matches.truncate(options.result_limit());

    let ids_by_relevance: Vec<u64> = matches.iter().map(|m| m.id).collect();
    let mut ids_chronological = ids_by_relevance.clone();
    ids_chronological.sort_unstable();
    let results_by_id: BTreeMap<u64, MatchResult> = matches.into_iter().map(|m| (m.id, m)).collect();

    #[cfg(feature = "perf-log")]
    tracing::debug!(
        match_ms = (t1 - t0).as_secs_f64() * 1000.0,
        assemble_ms = t1.elapsed().as_secs_f64() * 1000.0,
        "search timings"
    );

    tracing::debug!(query, items = corpus.len(), matched = ids_by_relevance.len(), "search finished");

    Ok(SearchResultSet {
        query: Some(query.to_string()),
        results_by_id,
        ids_by_relevance,
        ids_chronological,
    })
}

/// Match, refine, validate and highlight one item.
fn match_item(
    prepared: &PreparedItem,
    terms: &[SearchTerm],
    matcher: &dyn TextMatcher,
    options: &SearchOptions,
) -> Result<Option<MatchResult>, SearchError> {
    let Some(raw) = matcher.find_terms(prepared.text(), terms) else {
        return Ok(None);
    };
    if options.min_score.is_some_and(|min| raw.score < min) {
        return Ok(None);
    }

    let refined = if options.refine { refine_terms(matcher, raw, terms) } else { raw };

    if options.validate && !validate_terms(prepared.tokens(), terms, &refined)? {
        return Ok(None);
    }

    let ranges = highlight_ranges(&refined);
    let item = prepared.item();
    Ok(Some(MatchResult {
        id: item.id,
        item: item.clone(),
        score: refined.score,
        highlighted_chunks: chunks_from_ranges(item.text(), &ranges),
        highlight_ranges: ranges,
    }))
}
