// src/ingest/dedup.rs
use serde::Deserialize;
use std::collections::HashSet;

use crate::ingest::types::Entry;

/// What to do with entries whose `link` is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyLinkPolicy {
    /// Empty links never collapse; every link-less entry is kept.
    #[default]
    Distinct,
    /// Empty string is an ordinary key: only the first link-less entry survives.
    Shared,
}

/// Keep the first occurrence of every `link`, in input order.
pub fn dedupe(entries: Vec<Entry>, policy: EmptyLinkPolicy) -> Vec<Entry> {
    let mut seen: HashSet<String> = HashSet::with_capacity(entries.len());
    let mut keep = Vec::with_capacity(entries.len());

    for e in entries {
        if e.link.is_empty() && policy == EmptyLinkPolicy::Distinct {
            keep.push(e);
            continue;
        }
        if seen.insert(e.link.clone()) {
            keep.push(e);
        }
    }
    keep
}
