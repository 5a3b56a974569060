// src/watch.rs
//! The press watch: provider + configuration + result cache behind one handle.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::cache::{CacheLookup, CacheStatus, ResultCache};
use crate::config::WatchConfig;
use crate::filter::{self, Facets, ViewFilter};
use crate::ingest::{self, providers::GoogleNewsProvider, types::Entry, types::FeedProvider};

/// Filtered slice of one cached result set, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub count: usize,
    pub limit: usize,
    pub computed_at: DateTime<Utc>,
    pub facets: Facets,
    pub entries: Vec<Entry>,
    #[serde(skip)]
    pub cache: CacheStatus,
}

pub struct NewsWatch {
    provider: Arc<dyn FeedProvider>,
    config: WatchConfig,
    cache: ResultCache,
}

impl NewsWatch {
    pub fn new(provider: Arc<dyn FeedProvider>, config: WatchConfig) -> Self {
        ingest::ensure_metrics_described();
        let cache = ResultCache::new(config.cache_ttl());
        Self {
            provider,
            config,
            cache,
        }
    }

    /// Production wiring: Google News over HTTP with the configured locale.
    pub fn from_config(config: WatchConfig) -> Result<Self> {
        let provider = GoogleNewsProvider::from_settings(config.provider.clone())?;
        Ok(Self::new(Arc::new(provider), config))
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Ranked, deduplicated result set for `limit` entries per query
    /// (clamped to the configured range), served from cache while fresh.
    pub async fn articles(&self, limit: Option<usize>) -> CacheLookup {
        let limit = self.config.limit.clamp(limit);
        let provider = Arc::clone(&self.provider);
        let cfg = &self.config;
        self.cache
            .get_or_compute(limit, || {
                ingest::run_pipeline(
                    provider,
                    &cfg.queries,
                    limit,
                    cfg.fetch_timeout(),
                    cfg.dedup.empty_links,
                )
            })
            .await
    }

    /// Apply `filter` to the cached result set. Facets describe the unfiltered set.
    pub async fn view(&self, limit: Option<usize>, filter: &ViewFilter) -> View {
        let limit = self.config.limit.clamp(limit);
        let lookup = self.articles(Some(limit)).await;
        let snap = &lookup.snapshot;
        let entries = filter::apply(&snap.entries, filter);
        View {
            count: entries.len(),
            limit,
            computed_at: snap.computed_at,
            facets: filter::facets(&snap.entries),
            entries,
            cache: lookup.status,
        }
    }

    /// Manual refresh: the next call recomputes regardless of TTL.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate();
    }
}
