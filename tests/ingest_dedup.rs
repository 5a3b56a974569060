// tests/ingest_dedup.rs
use press_watch::ingest::dedup::{dedupe, EmptyLinkPolicy};
use press_watch::Entry;

fn entry(link: &str, title: &str) -> Entry {
    Entry {
        timestamp: None,
        title: title.into(),
        link: link.into(),
        source_name: String::new(),
        query: "q".into(),
        display_date: String::new(),
    }
}

#[test]
fn first_occurrence_wins() {
    let out = dedupe(vec![entry("a", "T1"), entry("a", "T2")], EmptyLinkPolicy::Distinct);
    assert_eq!(out, vec![entry("a", "T1")]);
}

#[test]
fn dedupe_is_idempotent() {
    let raw = vec![
        entry("a", "1"),
        entry("b", "2"),
        entry("", "3"),
        entry("a", "4"),
        entry("", "5"),
        entry("c", "6"),
        entry("b", "7"),
    ];
    for policy in [EmptyLinkPolicy::Distinct, EmptyLinkPolicy::Shared] {
        let once = dedupe(raw.clone(), policy);
        let twice = dedupe(once.clone(), policy);
        assert_eq!(once, twice, "policy {policy:?}");
    }
}

#[test]
fn link_less_entries_survive_by_default() {
    let out = dedupe(
        vec![entry("", "x"), entry("", "y"), entry("", "z")],
        EmptyLinkPolicy::default(),
    );
    assert_eq!(out.len(), 3);
}
