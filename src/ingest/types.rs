// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Nested `<source>` element of a feed item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSource {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// One item as the provider hands it over, before any normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub published: Option<String>, // free-form, e.g. RFC 2822 pubDate
    pub updated: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub source: Option<RawSource>,
}

/// One aggregated, normalized item.
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
pub struct Entry {
    pub timestamp: Option<DateTime<Utc>>,
    pub title: String,
    pub link: String,
    pub source_name: String,
    pub query: String,
    /// Filled by the ranker; empty until then.
    pub display_date: String,
}

#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    /// Return at most `limit` raw entries for `query`, in provider order.
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<RawEntry>>;
    fn name(&self) -> &'static str;
}
