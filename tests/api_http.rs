// tests/api_http.rs
//
// HTTP-level tests for the public Router without opening sockets,
// driven by tower::ServiceExt::oneshot over fixture feeds.

use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt as _; // for `oneshot`

use press_watch::api::CACHE_HEADER;
use press_watch::ingest::providers::GoogleNewsProvider;
use press_watch::{NewsWatch, WatchConfig};

const BODY_LIMIT: usize = 1024 * 1024;

fn test_app() -> Router {
    let provider = GoogleNewsProvider::from_fixtures([
        ("qa", include_str!("fixtures/google_news_a.xml")),
        ("qb", include_str!("fixtures/google_news_b.xml")),
    ]);
    let cfg = WatchConfig {
        queries: vec!["qa".into(), "qb".into()],
        ..Default::default()
    };
    press_watch::app(Arc::new(NewsWatch::new(Arc::new(provider), cfg)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET")
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let cache = resp
        .headers()
        .get(CACHE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, cache, bytes)
}

#[tokio::test]
async fn health_returns_ok() {
    let app = test_app();
    let (status, _, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "ok");
}

#[tokio::test]
async fn articles_miss_then_hit_then_refresh() {
    let app = test_app();

    let (status, cache, body) = send(&app, get("/articles")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache.as_deref(), Some("MISS"));
    let v: Json = serde_json::from_slice(&body).expect("json");
    assert_eq!(v["count"], 5);
    assert_eq!(v["limit"], 50);
    assert_eq!(v["entries"][0]["source_name"], "Le Monde");
    assert_eq!(v["entries"][0]["display_date"], "01/06/2024");
    assert_eq!(v["entries"][4]["display_date"], "unknown");

    let (_, cache, _) = send(&app, get("/articles")).await;
    assert_eq!(cache.as_deref(), Some("HIT"));

    let refresh = Request::builder()
        .method("POST")
        .uri("/refresh")
        .body(Body::empty())
        .expect("build POST /refresh");
    let (status, _, body) = send(&app, refresh).await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).expect("json");
    assert_eq!(v["invalidated"], true);

    let (_, cache, _) = send(&app, get("/articles")).await;
    assert_eq!(cache.as_deref(), Some("MISS"));
}

#[tokio::test]
async fn articles_filters_leave_facets_whole() {
    let app = test_app();

    let (_, _, body) = send(&app, get("/articles?source=Le%20Monde&q=VIOL")).await;
    let v: Json = serde_json::from_slice(&body).expect("json");
    assert_eq!(v["count"], 2);
    let links: Vec<&str> = v["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["link"].as_str().unwrap())
        .collect();
    assert!(links[0].contains("L5"));
    assert!(links[1].contains("L1"));
    assert_eq!(v["facets"]["sources"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn facets_lists_sources_and_queries() {
    let app = test_app();
    let (status, _, body) = send(&app, get("/facets?limit=20")).await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).expect("json");
    assert_eq!(
        v["sources"],
        serde_json::json!(["France Info", "Le Monde", "Libération"])
    );
    assert_eq!(v["queries"], serde_json::json!(["qa", "qb"]));
}

#[tokio::test]
async fn limit_is_clamped_into_range() {
    let app = test_app();
    let (_, _, body) = send(&app, get("/articles?limit=1000")).await;
    let v: Json = serde_json::from_slice(&body).expect("json");
    assert_eq!(v["limit"], 100);
}
