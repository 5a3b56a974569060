//! View filters over a ranked result set: exact source, exact query, and
//! case-insensitive title substring, combined with AND.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ingest::types::Entry;

/// Selector value meaning "no restriction".
pub const ALL: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ViewFilter {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    /// Title search text.
    #[serde(default, alias = "q")]
    pub title: Option<String>,
}

/// Option lists for the source and query selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub sources: Vec<String>,
    pub queries: Vec<String>,
}

impl ViewFilter {
    pub fn is_empty(&self) -> bool {
        selector(&self.source).is_none()
            && selector(&self.query).is_none()
            && needle(&self.title).is_none()
    }
}

/// Absent, blank and [`ALL`] all mean "no predicate".
fn selector(v: &Option<String>) -> Option<&str> {
    let s = v.as_deref()?;
    if s.trim().is_empty() || s.trim().eq_ignore_ascii_case(ALL) {
        None
    } else {
        Some(s)
    }
}

fn needle(v: &Option<String>) -> Option<String> {
    let s = v.as_deref()?.trim();
    (!s.is_empty()).then(|| s.to_lowercase())
}

/// Narrow `entries` to those matching every active predicate. Input order is kept.
pub fn apply(entries: &[Entry], filter: &ViewFilter) -> Vec<Entry> {
    let source = selector(&filter.source);
    let query = selector(&filter.query);
    let title = needle(&filter.title);

    entries
        .iter()
        .filter(|e| source.map_or(true, |s| e.source_name == s))
        .filter(|e| query.map_or(true, |q| e.query == q))
        .filter(|e| {
            title
                .as_deref()
                .map_or(true, |n| e.title.to_lowercase().contains(n))
        })
        .cloned()
        .collect()
}

/// Sorted, distinct, non-empty sources and queries present in `entries`.
pub fn facets(entries: &[Entry]) -> Facets {
    let mut sources = BTreeSet::new();
    let mut queries = BTreeSet::new();
    for e in entries {
        if !e.source_name.is_empty() {
            sources.insert(e.source_name.clone());
        }
        if !e.query.is_empty() {
            queries.insert(e.query.clone());
        }
    }
    Facets {
        sources: sources.into_iter().collect(),
        queries: queries.into_iter().collect(),
    }
}
