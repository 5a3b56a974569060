// src/ingest/providers/google_news.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::watch::ProviderSettings;
use crate::ingest::types::{FeedProvider, RawEntry, RawSource};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    // `<dc:date>` arrives without its prefix; `<atom:updated>` as `updated`.
    #[serde(alias = "date")]
    updated: Option<String>,
    source: Option<ItemSource>,
}

#[derive(Debug, Deserialize)]
struct ItemSource {
    #[serde(rename = "@url", default)]
    url: Option<String>,
    #[serde(rename = "$text", default)]
    name: Option<String>,
}

impl From<Item> for RawEntry {
    fn from(it: Item) -> Self {
        RawEntry {
            published: it.pub_date,
            updated: it.updated,
            title: it.title,
            link: it.link,
            source: it.source.map(|s| RawSource {
                name: s.name,
                url: s.url,
            }),
        }
    }
}

/// Google News RSS search provider.
pub struct GoogleNewsProvider {
    settings: ProviderSettings,
    mode: Mode,
}

enum Mode {
    /// Query → RSS document. Unknown queries fail like an unreachable feed.
    Fixture(HashMap<String, String>),
    Http { client: reqwest::Client },
}

impl GoogleNewsProvider {
    pub fn from_settings(settings: ProviderSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("building google news http client")?;
        Ok(Self {
            settings,
            mode: Mode::Http { client },
        })
    }

    /// Serve canned documents instead of calling the network.
    pub fn from_fixtures<I, Q, X>(fixtures: I) -> Self
    where
        I: IntoIterator<Item = (Q, X)>,
        Q: Into<String>,
        X: Into<String>,
    {
        Self {
            settings: ProviderSettings::default(),
            mode: Mode::Fixture(
                fixtures
                    .into_iter()
                    .map(|(q, x)| (q.into(), x.into()))
                    .collect(),
            ),
        }
    }

    /// `{base}?q=..&hl=..&gl=..&ceid=..` with the query URL-encoded.
    pub fn search_url(&self, query: &str) -> Result<Url> {
        let s = &self.settings;
        Url::parse_with_params(
            &s.base_url,
            &[
                ("q", query),
                ("hl", s.hl.as_str()),
                ("gl", s.gl.as_str()),
                ("ceid", s.ceid.as_str()),
            ],
        )
        .with_context(|| format!("building search url from {}", s.base_url))
    }

    pub fn parse_items_from_str(s: &str, limit: usize) -> Result<Vec<RawEntry>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing google news rss xml")?;

        let out: Vec<RawEntry> = rss
            .channel
            .item
            .into_iter()
            .take(limit)
            .map(RawEntry::from)
            .collect();

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("watch_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl FeedProvider for GoogleNewsProvider {
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<RawEntry>> {
        match &self.mode {
            Mode::Fixture(docs) => {
                let doc = docs
                    .get(query)
                    .ok_or_else(|| anyhow!("no fixture for query {query:?}"))?;
                Self::parse_items_from_str(doc, limit)
            }
            Mode::Http { client } => {
                let url = self.search_url(query)?;
                let body = match client.get(url).send().await {
                    Ok(resp) => resp
                        .error_for_status()
                        .context("google news http status")?
                        .text()
                        .await
                        .context("google news http .text()")?,
                    Err(e) => {
                        counter!("watch_http_errors_total").increment(1);
                        return Err(e).context("google news http get()");
                    }
                };
                Self::parse_items_from_str(&body, limit)
            }
        }
    }

    fn name(&self) -> &'static str {
        "GoogleNews"
    }
}

/// HTML-only named entities are not valid XML; replace the common ones.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&laquo;", "\"")
        .replace("&raquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
