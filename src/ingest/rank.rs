// src/ingest/rank.rs
use std::cmp::Ordering;

use crate::ingest::dates::display_date;
use crate::ingest::types::Entry;

/// Newest first, undated last. Ties keep first-seen order (stable sort).
/// Fills `display_date` on every entry.
pub fn rank(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.sort_by(|a, b| match (&a.timestamp, &b.timestamp) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    for e in entries.iter_mut() {
        e.display_date = display_date(e.timestamp.as_ref());
    }
    entries
}
