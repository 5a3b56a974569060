//! Press Watch binary entrypoint.
//! Boots the Axum HTTP server: loads the watch config, wires the Google News
//! provider, the result cache, and the `/metrics` route.

use std::sync::Arc;

use press_watch::{metrics::Metrics, NewsWatch, WatchConfig};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON when `LOG_FORMAT=json`.
/// Uses `try_init` so a subscriber installed by the runtime wins.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("press_watch=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = WatchConfig::load_default()?;
    tracing::info!(
        queries = cfg.queries.len(),
        ttl_secs = cfg.cache.ttl_secs,
        default_limit = cfg.limit.default,
        "press watch configured"
    );

    let metrics = Metrics::init(cfg.cache.ttl_secs)?;
    let watch = Arc::new(NewsWatch::from_config(cfg)?);

    let router = press_watch::app(watch).merge(metrics.router());
    Ok(router.into())
}
