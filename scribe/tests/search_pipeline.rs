//! End-to-end behavior of the synchronous search pass over realistic transcript lines.

use scribe::{search_items, search_items_with, ItemContent, ResultOrder, SearchOptions, SearchResultSet, TranscriptInput};

const ALICE: [&str; 4] = [
    "Her first idea was that she had somehow fallen into the sea, \"and in that case I can go back by railway\"",
    "The Mouse looked at her rather inquisitively, and seemed to her to wink with one of its little eyes",
    "Just then her head struck against the roof of the hall: in fact she was now more than nine feet high",
    "However, this bottle was not marked \u{201c}poison,\u{201d} so Alice ventured to taste it",
];

const SHORT: [&str; 4] = [
    "So he rinsed the soap off.",
    "Some children are messy when they drink milk, but not Phil.",
    "The quick brown fox jumps over the lazy dog.",
    "Kevin's dog is named Kalvin.",
];

fn plain(texts: &[&str]) -> Vec<TranscriptInput> {
    texts.iter().map(|&t| t.into()).collect()
}

fn assert_consistent(set: &SearchResultSet) {
    assert_eq!(set.ids_by_relevance.len(), set.results_by_id.len());
    let mut sorted = set.ids_by_relevance.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, set.ids_chronological);
    for id in &set.ids_chronological {
        let m = &set.results_by_id[id];
        assert_eq!(m.id, *id);
        assert_eq!(m.highlighted_chunks.concat(), m.item.text());
    }
    for pair in set.ids_by_relevance.windows(2) {
        let (a, b) = (&set.results_by_id[&pair[0]], &set.results_by_id[&pair[1]]);
        assert!(a.score > b.score || (a.score == b.score && a.id < b.id));
    }
}

#[test]
fn test_empty_query_contract() {
    let items = plain(&SHORT);
    for query in [None, Some(""), Some("   "), Some("\t\n")] {
        let set = search_items(query, &items);
        assert!(set.results_by_id.is_empty());
        assert!(set.ids_by_relevance.is_empty());
        assert!(set.ids_chronological.is_empty());
        assert!(!set.is_active());
    }
}

#[test]
fn test_search_is_deterministic() {
    let mut items = plain(&ALICE);
    items.extend(plain(&SHORT));
    for query in ["the", "so", "her to", "dog"] {
        let first = search_items(Some(query), &items);
        let second = search_items(Some(query), &items);
        assert_eq!(first, second, "query {query:?}");
        assert_consistent(&first);
    }
}

#[test]
fn test_scattered_match_is_refined_and_accepted() {
    let set = search_items(Some("tlewas"), &plain(&ALICE));
    assert_eq!(set.ids_by_relevance, vec![3]);
    let m = set.get(3).unwrap();
    assert!(m.marked_text("[", "]").starts_with("However, this bot[tle] [was] not marked"));
}

#[test]
fn test_term_spanning_adjacent_words() {
    let set = search_items(Some("quickbro"), &plain(&SHORT));
    assert_eq!(set.ids_by_relevance, vec![2]);
    assert_eq!(set.get(2).unwrap().marked_text("[", "]"), "The [quick] [bro]wn fox jumps over the lazy dog.");
}

#[test]
fn test_term_stitched_from_unrelated_words_is_rejected() {
    let set = search_items(Some("sohe"), &plain(&[SHORT[1]]));
    assert!(set.is_active());
    assert!(set.is_empty());

    let set = search_items(Some("dognamed"), &plain(&[SHORT[3]]));
    assert!(set.is_empty());
}

#[test]
fn test_multiple_terms_in_any_order() {
    let set = search_items(Some("not messy"), &plain(&SHORT));
    assert_eq!(set.ids_by_relevance, vec![1]);
    assert_eq!(
        set.get(1).unwrap().highlighted_chunks,
        vec!["Some children are ", "messy", " when they drink milk, but ", "not", " Phil."]
    );
}

#[test]
fn test_apostrophes_glue_query_terms() {
    let set = search_items(Some("kevin's"), &plain(&SHORT));
    assert_eq!(set.ids_by_relevance, vec![3]);
    assert_eq!(set.get(3).unwrap().marked_text("<", ">"), "<Kevin>'<s> dog is named Kalvin.");
}

#[test]
fn test_non_ascii_offsets_are_codepoints() {
    let set = search_items(Some("café"), &plain(&["un naïve café crème"]));
    let m = set.get(0).unwrap();
    assert_eq!(m.highlight_ranges.len(), 1);
    assert_eq!((m.highlight_ranges[0].start, m.highlight_ranges[0].end), (9, 13));
    assert_eq!(m.highlighted_chunks, vec!["un naïve ", "café", " crème"]);
}

#[test]
fn test_uppercase_non_ascii_query_matches_lowercase_text() {
    let set = search_items(Some("CAFÉ"), &plain(&["un café"]));
    assert_eq!(set.ids_by_relevance, vec![0]);
    assert_eq!(set.get(0).unwrap().highlighted_chunks, vec!["un ", "café"]);

    let set = search_items(Some("ÉCOLE"), &plain(&["une école", "un collège"]));
    assert_eq!(set.ids_by_relevance, vec![0]);
}

#[test]
fn test_structured_items_keep_timing_and_speaker() {
    let items: Vec<TranscriptInput> = serde_json::from_str(
        r#"[
            {"text": "So he rinsed the soap off.", "begin": 0.0, "end": 2.5, "speaker": "Narrator"},
            "Kevin's dog is named Kalvin.",
            {"begin": 4.0, "end": 5.0},
            {"text": "More soap, please.", "begin": 5.0, "end": 7.25, "lang": "en"}
        ]"#,
    )
    .unwrap();

    let set = search_items(Some("soap"), &items);
    assert_eq!(set.ids_chronological, vec![0, 3]);
    assert_consistent(&set);

    let first = set.get(0).unwrap();
    assert_eq!(first.item.speaker.as_deref(), Some("Narrator"));
    assert_eq!(first.item.content.span(), Some((0.0, 2.5)));
    let last = set.get(3).unwrap();
    assert_eq!(last.item.extra.get("lang").and_then(|v| v.as_str()), Some("en"));
    assert!(matches!(last.item.content, ItemContent::Timed { .. }));
}

#[test]
fn test_items_without_text_yield_empty_results() {
    let items: Vec<TranscriptInput> = serde_json::from_str(r#"[{"begin": 1.0}, {"speaker": "Bob"}]"#).unwrap();
    let set = search_items(Some("anything"), &items);
    assert!(set.is_active());
    assert!(set.is_empty());
}

#[test]
fn test_navigation_over_results() {
    let items = plain(&["the soap", "no match", "soap", "a soap dish"]);
    let set = search_items_with(Some("soap"), &items, &SearchOptions::default());
    assert_eq!(set.ids_chronological, vec![0, 2, 3]);

    let order = ResultOrder::Chronological;
    assert_eq!(set.next_id(None, order), Some(0));
    assert_eq!(set.next_id(Some(3), order), Some(0));
    assert_eq!(set.previous_id(Some(0), order), Some(3));
    assert_eq!(set.position(2, order), Some((2, 3)));
}
