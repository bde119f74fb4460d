//! TranscriptSearcher - async search orchestrator
//!
//! Owns the item set (as a [`CorpusCache`]) and the current result set, and
//! drives the synchronous search pass on a blocking thread.
//!
//! Cancellation Architecture:
//! Every search invocation owns a CancellationToken. Starting a newer search,
//! replacing the items, or disabling search cancels the previous token, and a
//! DropGuard cancels it when the caller drops the search future. The blocking
//! pass checks the token between items. Results are applied under the same lock
//! that cancels tokens, so a superseded pass can never overwrite newer results.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::candidate::CorpusCache;
use crate::interface::{SearchError, SearchOptions, SearchResultSet, TranscriptInput, TranscriptSearchApi};
use crate::matcher::{matcher_for, TextMatcher};
use crate::search::{self, is_blank_query};

/// Global fallback Tokio runtime for when async functions are called outside any runtime context.
/// Shared across all searchers and never dropped.
static FALLBACK_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create fallback tokio runtime")
});

/// RAII guard that cancels a token when dropped.
/// Dropping an unfinished search future drops this guard and cancels the pass.
struct DropGuard {
    token: CancellationToken,
}

impl DropGuard {
    fn new(token: CancellationToken) -> Self {
        Self { token }
    }
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

struct SearchState {
    /// Token of the newest invocation that has not applied yet
    in_flight: Option<CancellationToken>,
    current: Arc<SearchResultSet>,
    enabled: bool,
}

impl SearchState {
    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }

    fn apply(&mut self, results: SearchResultSet) -> Arc<SearchResultSet> {
        self.in_flight = None;
        self.current = Arc::new(results);
        Arc::clone(&self.current)
    }
}

/// Thread-safe transcript searcher
///
/// Concurrency Model:
/// - Lock order is `state` then `cache`; neither is held across an await
/// - Search is async with cancellation support via CancellationToken
/// - Blocking work runs on tokio::spawn_blocking threads, per-item work on rayon
/// - Uses global FALLBACK_RUNTIME when called outside any runtime
pub struct TranscriptSearcher {
    options: SearchOptions,
    matcher: Arc<dyn TextMatcher>,
    cache: Mutex<CorpusCache>,
    state: Mutex<SearchState>,
}

impl Default for TranscriptSearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptSearcher {
    /// Searcher with default options and no items
    pub fn new() -> Self {
        Self::with_options(SearchOptions::default())
    }

    pub fn with_options(options: SearchOptions) -> Self {
        let matcher = matcher_for(options.matcher);
        Self::with_matcher(options, matcher)
    }

    /// Searcher driven by a caller-supplied matcher; `options.matcher` is ignored.
    pub fn with_matcher(options: SearchOptions, matcher: Arc<dyn TextMatcher>) -> Self {
        search::init_rayon();
        Self {
            options,
            matcher,
            cache: Mutex::new(CorpusCache::new()),
            state: Mutex::new(SearchState {
                in_flight: None,
                current: Arc::new(SearchResultSet::empty()),
                enabled: true,
            }),
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Number of items in the current item set
    pub fn item_count(&self) -> usize {
        self.cache.lock().corpus().len()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Drop the item set and its cached tokenization; clears the visible results.
    pub fn clear_items(&self) {
        let mut state = self.state.lock();
        state.cancel_in_flight();
        self.cache.lock().invalidate();
        state.current = Arc::new(SearchResultSet::empty());
    }

    /// Get a tokio runtime handle - uses current runtime if available, otherwise global fallback
    fn runtime_handle(&self) -> tokio::runtime::Handle {
        tokio::runtime::Handle::try_current()
            .unwrap_or_else(|_| FALLBACK_RUNTIME.handle().clone())
    }
}

#[async_trait::async_trait]
impl TranscriptSearchApi for TranscriptSearcher {
    /// Search the current item set.
    ///
    /// A blank query or a disabled searcher applies the inactive result set
    /// without touching the matcher. Dropping the returned future cancels the
    /// blocking pass.
    async fn search(&self, query: Option<String>) -> Result<Option<Arc<SearchResultSet>>, SearchError> {
        let token = CancellationToken::new();

        let corpus = {
            let mut state = self.state.lock();
            state.cancel_in_flight();
            if !state.enabled || is_blank_query(query.as_deref()) {
                return Ok(Some(state.apply(SearchResultSet::empty())));
            }
            state.in_flight = Some(token.clone());
            self.cache.lock().corpus()
        };

        let _guard = DropGuard::new(token.clone());

        let matcher = Arc::clone(&self.matcher);
        let options = self.options.clone();
        let token_clone = token.clone();

        // Handle::spawn_blocking rather than tokio::task::spawn_blocking so that
        // callers outside a runtime land on the fallback runtime.
        let handle = self.runtime_handle().spawn_blocking(move || {
            search::search_corpus(&corpus, query.as_deref(), matcher.as_ref(), &options, &token_clone)
        });

        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Err(SearchError::Cancelled),
            Err(e) => Err(SearchError::TaskFailed(e.to_string())),
        };

        match outcome {
            Ok(results) => {
                let mut state = self.state.lock();
                if token.is_cancelled() {
                    tracing::debug!("discarding superseded search results");
                    return Ok(None);
                }
                Ok(Some(state.apply(results)))
            }
            Err(SearchError::Cancelled) => Ok(None),
            Err(e) => {
                let mut state = self.state.lock();
                // an uncancelled token is still the newest invocation
                if !token.is_cancelled() {
                    state.in_flight = None;
                }
                Err(e)
            }
        }
    }

    fn set_items(&self, items: Vec<TranscriptInput>) -> bool {
        let mut state = self.state.lock();
        let changed = self.cache.lock().load(&items);
        if changed {
            state.cancel_in_flight();
            state.current = Arc::new(SearchResultSet::empty());
            tracing::debug!(items = items.len(), "item set replaced");
        }
        changed
    }

    fn set_enabled(&self, enabled: bool) {
        let mut state = self.state.lock();
        state.enabled = enabled;
        if !enabled {
            state.cancel_in_flight();
            state.current = Arc::new(SearchResultSet::empty());
        }
    }

    fn results(&self) -> Arc<SearchResultSet> {
        Arc::clone(&self.state.lock().current)
    }
}
