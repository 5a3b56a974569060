//! # Result Cache
//! Time-boxed memo of ranked result sets, keyed by per-query fetch limit.
//!
//! - A snapshot is fresh for `ttl` after its computation finished.
//! - `invalidate()` retires every snapshot at once (epoch bump); the next call recomputes.
//! - At most one recomputation per key runs at a time; concurrent callers
//!   wait for it and share the resulting `Arc<Snapshot>`.
//! - Snapshots are never mutated; a recomputation swaps in a new one.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::counter;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;

use crate::ingest::types::Entry;

/// One immutable, ranked result set.
#[derive(Debug)]
pub struct Snapshot {
    pub entries: Vec<Entry>,
    pub computed_at: DateTime<Utc>,
    finished: Instant,
    epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub snapshot: Arc<Snapshot>,
    pub status: CacheStatus,
}

#[derive(Default)]
struct Slot {
    current: RwLock<Option<Arc<Snapshot>>>,
    refresh: AsyncMutex<()>,
}

pub struct ResultCache {
    ttl: Duration,
    slots: RwLock<HashMap<usize, Arc<Slot>>>,
    epoch: AtomicU64,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: RwLock::new(HashMap::new()),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the fresh snapshot for `limit`, or run `compute` and store its output.
    pub async fn get_or_compute<F, Fut>(&self, limit: usize, compute: F) -> CacheLookup
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<Entry>>,
    {
        let slot = self.slot(limit);
        if let Some(snapshot) = self.fresh(&slot) {
            counter!("watch_cache_hits_total").increment(1);
            return CacheLookup {
                snapshot,
                status: CacheStatus::Hit,
            };
        }

        let _refresh = slot.refresh.lock().await;
        // Whoever held the lock before us may have just refreshed it.
        if let Some(snapshot) = self.fresh(&slot) {
            counter!("watch_cache_hits_total").increment(1);
            return CacheLookup {
                snapshot,
                status: CacheStatus::Hit,
            };
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        tracing::debug!(target: "cache", limit, epoch, "recomputing result set");
        let entries = compute().await;

        let snapshot = Arc::new(Snapshot {
            entries,
            computed_at: Utc::now(),
            finished: Instant::now(),
            epoch,
        });
        *slot
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&snapshot));
        counter!("watch_cache_misses_total").increment(1);
        tracing::info!(
            target: "cache",
            limit,
            entries = snapshot.entries.len(),
            "result set cached"
        );

        CacheLookup {
            snapshot,
            status: CacheStatus::Miss,
        }
    }

    /// Retire every cached result set; the next call for any key recomputes.
    /// Slots are kept so a recomputation still in flight keeps holding its key.
    pub fn invalidate(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(target: "cache", epoch, "result cache invalidated");
    }

    fn slot(&self, limit: usize) -> Arc<Slot> {
        if let Some(s) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&limit)
        {
            return Arc::clone(s);
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(limit).or_default())
    }

    fn fresh(&self, slot: &Slot) -> Option<Arc<Snapshot>> {
        let guard = slot.current.read().unwrap_or_else(PoisonError::into_inner);
        let snap = guard.as_ref()?;
        let live = snap.epoch == self.epoch.load(Ordering::SeqCst)
            && snap.finished.elapsed() < self.ttl;
        live.then(|| Arc::clone(snap))
    }
}
