// src/config/watch.rs
//! Press-watch configuration: query set, cache TTL, fetch-limit range,
//! provider locale and dedup policy.
//!
//! Lookup order for [`WatchConfig::load_default`]:
//! 1) `$WATCH_CONFIG_PATH`
//! 2) `config/watch.toml`
//! 3) `config/watch.json`
//! 4) built-in defaults
//!
//! `WATCH_CACHE_TTL_SECS` overrides the TTL from any of the above.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ingest::dedup::EmptyLinkPolicy;

pub const ENV_CONFIG_PATH: &str = "WATCH_CONFIG_PATH";
pub const ENV_CACHE_TTL_SECS: &str = "WATCH_CACHE_TTL_SECS";

pub const DEFAULT_CACHE_TTL_SECS: u64 = 900;

/// Default watch queries (sexual and sexist violence
/// in the French art sector).
pub const DEFAULT_QUERIES: &[&str] = &[
    r#"("violences sexuelles" OR "violences sexistes" OR "harcèlement sexuel" OR viol OR agression) (art OR cinéma OR theatre OR musique OR "arts plastiques" OR photographie OR festival) France"#,
    r#"("violences sexuelles" OR "harcèlement sexuel") cinéma France"#,
    r#"("violences sexuelles" OR "harcèlement sexuel") théâtre France"#,
    r#"("violences sexuelles" OR "harcèlement sexuel") musique France"#,
    r#"("violences sexuelles" OR "harcèlement sexuel") festival France"#,
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Ordered; order decides which duplicate wins.
    pub queries: Vec<String>,
    pub cache: CacheSettings,
    pub limit: LimitRange,
    pub provider: ProviderSettings,
    pub dedup: DedupSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
}

/// Per-query fetch limit bounds (10..=100 step 10, default 50).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LimitRange {
    pub min: usize,
    pub max: usize,
    pub default: usize,
    pub step: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub base_url: String,
    pub hl: String,
    pub gl: String,
    pub ceid: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct DedupSettings {
    pub empty_links: EmptyLinkPolicy,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            queries: DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect(),
            cache: CacheSettings::default(),
            limit: LimitRange::default(),
            provider: ProviderSettings::default(),
            dedup: DedupSettings::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl Default for LimitRange {
    fn default() -> Self {
        Self {
            min: 10,
            max: 100,
            default: 50,
            step: 10,
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://news.google.com/rss/search".to_string(),
            hl: "fr".to_string(),
            gl: "FR".to_string(),
            ceid: "FR:fr".to_string(),
            timeout_secs: 10,
            user_agent: concat!("press-watch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl LimitRange {
    /// Missing → default; otherwise clamped into `[min, max]` and snapped down
    /// onto the step grid anchored at `min`.
    /// Bounds given in the wrong order are read as `[max, min]`.
    pub fn clamp(&self, requested: Option<usize>) -> usize {
        let (lo, hi) = (self.min.min(self.max), self.min.max(self.max));
        let v = requested.unwrap_or(self.default).clamp(lo, hi);
        let step = self.step.max(1);
        lo + (v - lo) / step * step
    }

    fn sanitized(mut self) -> Self {
        let fallback = Self::default();
        if self.min == 0 {
            self.min = 1;
        }
        if self.min > self.max {
            std::mem::swap(&mut self.min, &mut self.max);
        }
        if self.step == 0 {
            self.step = fallback.step;
        }
        self.default = self.default.clamp(self.min, self.max);
        self
    }
}

impl WatchConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading watch config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing watch config {}", path.display()))?;
        cfg.sanitized()
    }

    /// Env path, then `config/watch.{toml,json}`, then defaults; env overrides last.
    pub fn load_default() -> Result<Self> {
        let cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let toml_p = PathBuf::from("config/watch.toml");
            let json_p = PathBuf::from("config/watch.json");
            if toml_p.exists() {
                Self::load_from(&toml_p)?
            } else if json_p.exists() {
                Self::load_from(&json_p)?
            } else {
                Self::default()
            }
        };
        cfg.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(raw) = std::env::var(ENV_CACHE_TTL_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_CACHE_TTL_SECS} must be whole seconds"))?;
            self.cache.ttl_secs = secs;
        }
        self.sanitized()
    }

    /// Trim and de-duplicate queries (order kept), repair numeric ranges.
    pub fn sanitized(mut self) -> Result<Self> {
        let mut seen = HashSet::new();
        self.queries = self
            .queries
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty() && seen.insert(q.clone()))
            .collect();
        if self.queries.is_empty() {
            return Err(anyhow!("watch config has no queries"));
        }

        self.cache.ttl_secs = self.cache.ttl_secs.max(1);
        self.provider.timeout_secs = self.provider.timeout_secs.max(1);
        self.limit = self.limit.sanitized();
        Ok(self)
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<WatchConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).map_err(Into::into);
    }
    match toml::from_str(s) {
        Ok(cfg) => Ok(cfg),
        Err(toml_err) => {
            serde_json::from_str(s).map_err(|_| anyhow!("unsupported watch config format: {toml_err}"))
        }
    }
}
