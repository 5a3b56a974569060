// src/ingest/mod.rs
pub mod dates;
pub mod dedup;
pub mod providers;
pub mod rank;
pub mod types;

use crate::ingest::dedup::{dedupe, EmptyLinkPolicy};
use crate::ingest::rank::rank;
use crate::ingest::types::{Entry, FeedProvider, RawEntry};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "watch_entries_fetched_total",
            "Raw entries returned by the feed provider."
        );
        describe_counter!(
            "watch_provider_errors_total",
            "Per-query fetch/parse failures and timeouts."
        );
        describe_counter!(
            "watch_dedup_removed_total",
            "Entries dropped because their link was already seen."
        );
        describe_counter!(
            "watch_http_errors_total",
            "Transport-level failures talking to the feed endpoint."
        );
        describe_counter!("watch_cache_hits_total", "Result cache hits.");
        describe_counter!("watch_cache_misses_total", "Result cache recomputations.");
        describe_histogram!("watch_fetch_ms", "Per-query fetch time in milliseconds.");
        describe_histogram!("watch_parse_ms", "Feed document parse time in milliseconds.");
        describe_gauge!(
            "watch_last_refresh_ts",
            "Unix ts when the pipeline last produced a result set."
        );
    });
}

/// Decode stray HTML entities, collapse whitespace, trim.
pub fn clean_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("whitespace regex"));
    re_ws.replace_all(&decoded, " ").trim().to_string()
}

/// Map one provider item onto an [`Entry`] tagged with its query.
pub fn to_entry(query: &str, raw: RawEntry) -> Entry {
    // A blank pubDate falls through to `updated`.
    let date = raw
        .published
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or(raw.updated.as_deref());

    Entry {
        timestamp: dates::normalize(date),
        title: raw.title.as_deref().map(clean_text).unwrap_or_default(),
        link: raw
            .link
            .as_deref()
            .map(|l| l.trim().to_string())
            .unwrap_or_default(),
        source_name: raw
            .source
            .and_then(|s| s.name)
            .map(|n| clean_text(&n))
            .unwrap_or_default(),
        query: query.to_string(),
        display_date: String::new(),
    }
}

/// Fetch one query; errors and timeouts become an empty result.
pub async fn fetch_query(
    provider: &dyn FeedProvider,
    query: &str,
    limit: usize,
    timeout: Duration,
) -> Vec<RawEntry> {
    let t0 = Instant::now();
    let res = tokio::time::timeout(timeout, provider.fetch(query, limit)).await;
    histogram!("watch_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

    match res {
        Ok(Ok(mut items)) => {
            items.truncate(limit);
            counter!("watch_entries_fetched_total").increment(items.len() as u64);
            items
        }
        Ok(Err(e)) => {
            tracing::warn!(target: "ingest", error = ?e, provider = provider.name(), %query, "provider error");
            counter!("watch_provider_errors_total").increment(1);
            Vec::new()
        }
        Err(_) => {
            tracing::warn!(
                target: "ingest",
                provider = provider.name(),
                %query,
                timeout_ms = timeout.as_millis() as u64,
                "provider timed out"
            );
            counter!("watch_provider_errors_total").increment(1);
            Vec::new()
        }
    }
}

/// Fetch every query concurrently and concatenate in query order, then
/// provider order. Dedup and ranking happen downstream.
pub async fn collect(
    provider: Arc<dyn FeedProvider>,
    queries: &[String],
    limit: usize,
    timeout: Duration,
) -> Vec<Entry> {
    ensure_metrics_described();

    let mut set = JoinSet::new();
    for (idx, query) in queries.iter().enumerate() {
        let provider = Arc::clone(&provider);
        let query = query.clone();
        set.spawn(async move {
            let raw = fetch_query(provider.as_ref(), &query, limit, timeout).await;
            let entries: Vec<Entry> = raw.into_iter().map(|r| to_entry(&query, r)).collect();
            (idx, entries)
        });
    }

    let mut per_query: Vec<Vec<Entry>> = vec![Vec::new(); queries.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, entries)) => per_query[idx] = entries,
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, "query task failed");
                counter!("watch_provider_errors_total").increment(1);
            }
        }
    }

    per_query.into_iter().flatten().collect()
}

/// Aggregate → dedup → rank.
pub async fn run_pipeline(
    provider: Arc<dyn FeedProvider>,
    queries: &[String],
    limit: usize,
    timeout: Duration,
    policy: EmptyLinkPolicy,
) -> Vec<Entry> {
    let collected = collect(provider, queries, limit, timeout).await;
    let before = collected.len();
    let unique = dedupe(collected, policy);
    let removed = before - unique.len();
    let ranked = rank(unique);

    let now = chrono::Utc::now().timestamp().max(0);
    counter!("watch_dedup_removed_total").increment(removed as u64);
    gauge!("watch_last_refresh_ts").set(now as f64);

    tracing::info!(
        target: "ingest",
        queries = queries.len(),
        limit,
        fetched = before,
        dedup = removed,
        kept = ranked.len(),
        "pipeline run"
    );

    ranked
}
