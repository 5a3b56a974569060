// tests/ingest_pipeline.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use press_watch::ingest::dedup::EmptyLinkPolicy;
use press_watch::ingest::providers::GoogleNewsProvider;
use press_watch::ingest::types::{FeedProvider, RawEntry};
use press_watch::ingest::{self, dates::UNKNOWN_DATE};
use std::sync::Arc;
use std::time::Duration;

const FIXTURE_A: &str = include_str!("fixtures/google_news_a.xml");
const FIXTURE_B: &str = include_str!("fixtures/google_news_b.xml");

fn queries(qs: &[&str]) -> Vec<String> {
    qs.iter().map(|q| q.to_string()).collect()
}

fn fixture_provider() -> Arc<dyn FeedProvider> {
    Arc::new(GoogleNewsProvider::from_fixtures([
        ("qa", FIXTURE_A),
        ("qb", FIXTURE_B),
    ]))
}

#[tokio::test]
async fn fixtures_are_merged_deduped_and_ranked() {
    let out = ingest::run_pipeline(
        fixture_provider(),
        &queries(&["qa", "qb"]),
        50,
        Duration::from_secs(5),
        EmptyLinkPolicy::Distinct,
    )
    .await;

    let ids: Vec<&str> = out
        .iter()
        .map(|e| e.link.trim_start_matches("https://news.google.com/rss/articles/"))
        .collect();
    assert_eq!(ids, vec!["L5?oc=5", "L3?oc=5", "L1?oc=5", "L2?oc=5", "L4?oc=5"]);

    // The first query's copy of L1 wins.
    let l1 = &out[2];
    assert_eq!(l1.query, "qa");
    assert!(l1.title.starts_with("Festival"));
    assert_eq!(l1.source_name, "Le Monde");
    assert_eq!(l1.display_date, "02/01/2023");

    assert_eq!(out[3].display_date, UNKNOWN_DATE);
    assert_eq!(out[3].title, "Harcèlement sexuel : la parole se libère au conservatoire");
    assert_eq!(out[4].display_date, UNKNOWN_DATE);
}

#[tokio::test]
async fn failing_query_does_not_hide_the_others() {
    // "qc" has no fixture: the provider errors for it.
    let out = ingest::run_pipeline(
        fixture_provider(),
        &queries(&["qc", "qa", "qb"]),
        50,
        Duration::from_secs(5),
        EmptyLinkPolicy::Distinct,
    )
    .await;

    assert_eq!(out.len(), 5);
    assert!(out.iter().all(|e| e.query == "qa" || e.query == "qb"));
    let ts: Vec<_> = out.iter().filter_map(|e| e.timestamp).collect();
    assert!(ts.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn limit_is_applied_per_query() {
    let out = ingest::collect(
        fixture_provider(),
        &queries(&["qa", "qb"]),
        1,
        Duration::from_secs(5),
    )
    .await;
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].query, "qa");
    assert_eq!(out[1].query, "qb");
}

struct StallingProvider;

#[async_trait]
impl FeedProvider for StallingProvider {
    async fn fetch(&self, query: &str, _limit: usize) -> Result<Vec<RawEntry>> {
        if query == "slow" {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if query == "broken" {
            return Err(anyhow!("connection reset"));
        }
        Ok(vec![RawEntry {
            title: Some(format!("from {query}")),
            link: Some(format!("https://x.test/{query}")),
            ..Default::default()
        }])
    }

    fn name(&self) -> &'static str {
        "Stalling"
    }
}

#[tokio::test(start_paused = true)]
async fn timeouts_and_errors_degrade_to_empty() {
    let out = ingest::collect(
        Arc::new(StallingProvider),
        &queries(&["slow", "ok", "broken", "fine"]),
        10,
        Duration::from_secs(10),
    )
    .await;
    let titles: Vec<_> = out.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["from ok", "from fine"]);
}

#[tokio::test]
async fn every_query_failing_yields_zero_results() {
    let out = ingest::run_pipeline(
        fixture_provider(),
        &queries(&["nope", "nada"]),
        50,
        Duration::from_secs(5),
        EmptyLinkPolicy::Distinct,
    )
    .await;
    assert!(out.is_empty());
}
