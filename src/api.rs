use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderName, HeaderValue},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::filter::{Facets, ViewFilter};
use crate::watch::NewsWatch;

/// Diagnostics header: `HIT` when served from the result cache, `MISS` otherwise.
pub const CACHE_HEADER: &str = "x-cache";

#[derive(Clone)]
pub struct AppState {
    pub watch: Arc<NewsWatch>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/articles", get(articles))
        .route("/facets", get(facets))
        .route("/refresh", post(refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ArticlesReq {
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    query: Option<String>,
    /// Title search text.
    #[serde(default)]
    q: Option<String>,
}

impl ArticlesReq {
    fn filter(&self) -> ViewFilter {
        ViewFilter {
            source: self.source.clone(),
            query: self.query.clone(),
            title: self.q.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LimitReq {
    #[serde(default)]
    limit: Option<usize>,
}

async fn articles(
    State(state): State<AppState>,
    Query(req): Query<ArticlesReq>,
) -> impl IntoResponse {
    let view = state.watch.view(req.limit, &req.filter()).await;
    tracing::debug!(
        target: "api",
        limit = view.limit,
        count = view.count,
        cache = view.cache.as_str(),
        "articles view"
    );
    let header = (
        HeaderName::from_static(CACHE_HEADER),
        HeaderValue::from_static(view.cache.as_str()),
    );
    ([header], Json(view))
}

async fn facets(State(state): State<AppState>, Query(req): Query<LimitReq>) -> Json<Facets> {
    let lookup = state.watch.articles(req.limit).await;
    Json(crate::filter::facets(&lookup.snapshot.entries))
}

#[derive(Serialize)]
struct RefreshOut {
    invalidated: bool,
}

async fn refresh(State(state): State<AppState>) -> Json<RefreshOut> {
    state.watch.invalidate_cache();
    Json(RefreshOut { invalidated: true })
}
