// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod cache;
pub mod config;
pub mod filter;
pub mod ingest;
pub mod metrics;
pub mod watch;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::cache::{CacheLookup, CacheStatus, ResultCache};
pub use crate::config::WatchConfig;
pub use crate::filter::{Facets, ViewFilter};
pub use crate::ingest::types::{Entry, FeedProvider, RawEntry, RawSource};
pub use crate::watch::{NewsWatch, View};

use std::sync::Arc;

/// Build the HTTP app around an already configured watch.
pub fn app(watch: Arc<NewsWatch>) -> axum::Router {
    api::router(AppState { watch })
}
