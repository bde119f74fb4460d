//! Item normalization
//!
//! Callers hand over bare strings or structured cues; everything downstream
//! works on [`TranscriptItem`]. This is the only schema adaptation the engine
//! performs.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::interface::{ItemContent, StructuredInput, TranscriptInput, TranscriptItem};

impl TranscriptInput {
    /// Normalize into an item with the given id.
    ///
    /// A structured cue without `text` becomes empty plain text so it can never
    /// match. Cues carrying both `begin` and `end` become timed content.
    pub fn into_item(self, id: u64) -> TranscriptItem {
        match self {
            TranscriptInput::Plain(text) => TranscriptItem {
                id,
                content: ItemContent::Plain { text },
                speaker: None,
                extra: serde_json::Map::new(),
            },
            TranscriptInput::Structured(StructuredInput { text, begin, end, speaker, extra }) => {
                let text = text.unwrap_or_default();
                let content = match (begin, end) {
                    (Some(begin), Some(end)) => ItemContent::Timed { text, begin, end },
                    _ => ItemContent::Plain { text },
                };
                TranscriptItem { id, content, speaker, extra }
            }
        }
    }
}

/// Normalize an item set; ids follow insertion order.
pub fn normalize_items(inputs: &[TranscriptInput]) -> Vec<TranscriptItem> {
    inputs
        .iter()
        .cloned()
        .enumerate()
        .map(|(idx, input)| input.into_item(idx as u64))
        .collect()
}

/// Content fingerprint of a normalized item set. Extra pass-through fields are
/// not hashed; equal fingerprints still need a full comparison.
pub fn fingerprint(items: &[TranscriptItem]) -> u64 {
    let mut hasher = DefaultHasher::new();
    items.len().hash(&mut hasher);
    for item in items {
        item.id.hash(&mut hasher);
        item.text().hash(&mut hasher);
        item.content.span().map(|(b, e)| (b.to_bits(), e.to_bits())).hash(&mut hasher);
        item.speaker.hash(&mut hasher);
    }
    hasher.finish()
}
