//! Property tests for the tokenizers, token locator, refiner and highlighter.

use proptest::prelude::*;
use scribe::highlight::highlight;
use scribe::refine::refine;
use scribe::tokenizer::{find_token_index, tokenize, tokenize_query};
use scribe::{SkimTextMatcher, TextMatch, TextMatcher, TokenKind};

fn mixed_text() -> impl Strategy<Value = String> {
    prop_oneof![
        ".{0,40}",
        "[a-zA-Z0-9 ,.'\\-éü\t]{0,60}",
    ]
}

proptest! {
    #[test]
    fn tokenize_partitions_text(text in mixed_text()) {
        let tokens = tokenize(&text);
        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        prop_assert_eq!(&rebuilt, &text);

        let mut offset = 0;
        for (i, token) in tokens.iter().enumerate() {
            prop_assert_eq!(token.sequence_index, i);
            prop_assert_eq!(token.start_offset, offset);
            prop_assert!(!token.is_empty());
            prop_assert_eq!(token.codepoints.len(), token.len());
            prop_assert!(token.codepoints.iter().all(|&c| TokenKind::of(c) == token.kind));
            offset = token.end_offset;
        }
        prop_assert_eq!(offset, text.chars().count());
        for pair in tokens.windows(2) {
            prop_assert_ne!(pair[0].kind, pair[1].kind);
        }
    }

    #[test]
    fn query_terms_are_nonempty_word_runs(query in mixed_text()) {
        for term in tokenize_query(&query) {
            prop_assert!(!term.is_empty());
            prop_assert!(term.codepoints.iter().all(|&c| TokenKind::of(c) == TokenKind::Word));
            prop_assert_eq!(term.text.chars().collect::<Vec<_>>(), term.codepoints.clone());
        }
    }

    #[test]
    fn locator_finds_containing_token(text in mixed_text()) {
        let tokens = tokenize(&text);
        let len = text.chars().count();
        for offset in 0..len {
            let idx = find_token_index(&tokens, offset).unwrap();
            prop_assert!(tokens[idx].contains(offset));
        }
        prop_assert!(find_token_index(&tokens, len).is_err());
    }

    #[test]
    fn refinement_never_adds_breaks(text in "[abc ]{1,30}", query in "[abc]{1,4}") {
        let matcher = SkimTextMatcher::default();
        if let Some(raw) = matcher.find(&text, &query) {
            let raw_breaks = raw.contiguity_breaks();
            let raw_len = raw.matched_indices.len();
            let refined = refine(&matcher, raw, &query);
            prop_assert!(refined.contiguity_breaks() <= raw_breaks);
            prop_assert_eq!(refined.matched_indices.len(), raw_len);
            prop_assert!(refined.matched_indices.iter().all(|&i| i < text.chars().count()));
        }
    }

    #[test]
    fn highlight_chunks_rebuild_text(
        text in mixed_text(),
        indices in prop::collection::vec(0usize..64, 0..12),
    ) {
        let chunks = highlight(&TextMatch::new(&text, 0, indices));
        prop_assert_eq!(chunks.concat(), text);
        for (i, chunk) in chunks.iter().enumerate() {
            if i % 2 == 1 {
                prop_assert!(!chunk.is_empty());
            }
        }
    }
}
