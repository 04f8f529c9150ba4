// src/sources/news.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::model::NewsItem;
use crate::sources::types::{NewsSource, SourceResult};
use crate::sources::{normalize_text, request_failure_reason};

const CATEGORY: &str = "business";
const LANGUAGE: &str = "en";

#[derive(Debug, Deserialize)]
struct HeadlinesEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
}

/// Business-headlines client. The provider requires a credential; without
/// one every fetch reports `Unavailable` and the assembler degrades the news
/// panel to empty.
pub struct NewsClient {
    base: String,
    api_key: Option<String>,
    page_size: u32,
    client: reqwest::Client,
}

impl NewsClient {
    pub fn new(
        base: impl Into<String>,
        api_key: Option<String>,
        page_size: u32,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base: base.into(),
            api_key,
            page_size,
            client,
        }
    }

    async fn fetch_headlines(&self, api_key: &str) -> Result<Vec<NewsItem>> {
        let url = format!("{}/v2/top-headlines", self.base);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("category", CATEGORY),
                ("language", LANGUAGE),
                ("pageSize", &self.page_size.to_string()),
                ("apiKey", api_key),
            ])
            .send()
            .await
            .map_err(|e| anyhow!(request_failure_reason(&e)))?;
        let resp = resp
            .error_for_status()
            .map_err(|e| anyhow!("http status {}", e.status().map(|s| s.as_u16()).unwrap_or(0)))?;
        let body = resp.text().await.context("reading headlines body")?;
        parse_headlines(&body)
    }
}

/// Decode the `articles` array into normalized `NewsItem`s. A body with
/// `status != "ok"` carries the provider's own error message.
pub fn parse_headlines(body: &str) -> Result<Vec<NewsItem>> {
    let envelope: HeadlinesEnvelope = serde_json::from_str(body).context("malformed response")?;
    if envelope.status != "ok" {
        return Err(anyhow!(
            "provider error: {}",
            envelope.message.unwrap_or_else(|| envelope.status.clone())
        ));
    }

    let mut out = Vec::with_capacity(envelope.articles.len());
    for art in envelope.articles {
        let title = art
            .title
            .as_deref()
            .map(normalize_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "No title".to_string());
        let description = art
            .description
            .as_deref()
            .map(normalize_text)
            .filter(|d| !d.is_empty());
        out.push(NewsItem {
            title,
            url: art.url.unwrap_or_default(),
            description,
        });
    }
    Ok(out)
}

#[async_trait]
impl NewsSource for NewsClient {
    async fn top_headlines(&self) -> SourceResult<Vec<NewsItem>> {
        let Some(api_key) = self.api_key.as_deref() else {
            return SourceResult::Unavailable("NEWS_API_KEY not configured".to_string());
        };
        let t0 = std::time::Instant::now();
        let out = SourceResult::from(self.fetch_headlines(api_key).await);
        histogram!("source_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        if out.is_unavailable() {
            counter!("source_fetch_errors_total").increment(1);
        }
        out
    }
}
