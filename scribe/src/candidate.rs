//! Prepared items and the per-searcher corpus cache.
//!
//! Module isolation ensures no code outside this module can mutate an item
//! after construction, so the `OnceLock` token cache can never go stale.

use std::sync::{Arc, OnceLock};

use crate::interface::{TranscriptInput, TranscriptItem};
use crate::models::{fingerprint, normalize_items};
use crate::tokenizer::{tokenize, Token};

/// A transcript item with its tokenization computed on first access.
#[derive(Debug)]
pub struct PreparedItem {
    item: TranscriptItem,
    tokens: OnceLock<Vec<Token>>,
}

impl PreparedItem {
    pub fn new(item: TranscriptItem) -> Self {
        Self { item, tokens: OnceLock::new() }
    }

    pub fn item(&self) -> &TranscriptItem {
        &self.item
    }

    pub fn text(&self) -> &str {
        self.item.text()
    }

    pub fn tokens(&self) -> &[Token] {
        self.tokens.get_or_init(|| tokenize(self.item.text()))
    }
}

/// An immutable, normalized item set.
#[derive(Debug)]
pub struct Corpus {
    fingerprint: u64,
    items: Vec<PreparedItem>,
}

impl Default for Corpus {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Corpus {
    pub fn new(items: Vec<TranscriptItem>) -> Self {
        Self {
            fingerprint: fingerprint(&items),
            items: items.into_iter().map(PreparedItem::new).collect(),
        }
    }

    pub fn from_inputs(inputs: &[TranscriptInput]) -> Self {
        Self::new(normalize_items(inputs))
    }

    pub fn items(&self) -> &[PreparedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Content identity: fingerprint first, then a full comparison.
    pub fn same_content(&self, items: &[TranscriptItem]) -> bool {
        self.items.len() == items.len()
            && self.fingerprint == fingerprint(items)
            && self.items.iter().zip(items).all(|(p, i)| p.item() == i)
    }
}

/// Owned by one searcher; holds the current corpus until replaced or invalidated.
#[derive(Debug, Default)]
pub struct CorpusCache {
    corpus: Arc<Corpus>,
}

impl CorpusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an item set. Returns `false` and keeps the cached corpus (with its
    /// memoized tokens) when the content is unchanged.
    pub fn load(&mut self, inputs: &[TranscriptInput]) -> bool {
        let items = normalize_items(inputs);
        if self.corpus.same_content(&items) {
            return false;
        }
        self.corpus = Arc::new(Corpus::new(items));
        true
    }

    pub fn corpus(&self) -> Arc<Corpus> {
        Arc::clone(&self.corpus)
    }

    pub fn invalidate(&mut self) {
        self.corpus = Arc::new(Corpus::default());
    }
}
