//! Enrichment adapter: optional AI news summaries, batch sentiment and a
//! short market overview. When no credential is configured every method
//! degrades to a fixed sentinel instead of failing.

pub mod gemini;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::model::{NewsItem, SentimentJudgment, SentimentLabel};
use crate::sources::http_client;

pub use gemini::GeminiClient;

/// Returned by every enrichment method when no credential is configured.
pub const NOT_CONFIGURED: &str = "AI not configured.";

/// Summary fallback when enrichment is off and the article has no description.
pub const SUMMARY_UNAVAILABLE: &str = "Summary not available";

/// Upper bound on any model reply we keep.
const MAX_REPLY_CHARS: usize = 2000;

/// Marker embedded in place of a reply when a configured call fails.
pub fn error_marker(reason: &str) -> String {
    format!("[AI error] {reason}")
}

/// Trait object used by the assembler and tests.
#[async_trait]
pub trait EnrichClient: Send + Sync {
    /// Whether a real credential is present. Callers may skip enrichment
    /// entirely when this is false.
    fn is_configured(&self) -> bool;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
    /// Short synopsis of one article. Never fails: an unconfigured client
    /// returns [`NOT_CONFIGURED`], a failed call returns an error marker.
    async fn summarize(&self, item: &NewsItem) -> String;
    /// One judgment across the whole headline batch. `None` when
    /// unconfigured or when the batch is empty.
    async fn judge_sentiment(&self, headlines: &[String]) -> Option<SentimentJudgment>;
    /// Short multi-line narrative across the batch, same absence rules.
    async fn market_overview(&self, headlines: &[String]) -> Option<String>;
}

pub type DynEnrichClient = Arc<dyn EnrichClient>;

/// Factory: build a client from config and environment.
///
/// * If `AI_TEST_MODE=mock`, returns a deterministic mock client.
/// * Else if a Gemini key is configured, returns the real provider.
/// * Else returns a disabled client.
pub fn build_enrich_client(cfg: &AppConfig) -> DynEnrichClient {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        tracing::info!("enrichment running in mock mode (AI_TEST_MODE=mock)");
        return Arc::new(MockClient::default());
    }

    match cfg.gemini_api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => {
            tracing::info!(model = %cfg.gemini_model, "enrichment enabled: gemini");
            Arc::new(GeminiClient::new(
                cfg.gemini_base.clone(),
                cfg.gemini_model.clone(),
                key.to_string(),
                http_client(Duration::from_secs(cfg.http_timeout_secs)),
            ))
        }
        _ => {
            tracing::info!("enrichment disabled: no GEMINI_API_KEY");
            Arc::new(DisabledClient)
        }
    }
}

/// Client used when no credential is present.
pub struct DisabledClient;

#[async_trait]
impl EnrichClient for DisabledClient {
    fn is_configured(&self) -> bool {
        false
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
    async fn summarize(&self, _item: &NewsItem) -> String {
        NOT_CONFIGURED.to_string()
    }
    async fn judge_sentiment(&self, _headlines: &[String]) -> Option<SentimentJudgment> {
        None
    }
    async fn market_overview(&self, _headlines: &[String]) -> Option<String> {
        None
    }
}

/// Deterministic client for tests and local runs.
#[derive(Clone)]
pub struct MockClient {
    pub summary: String,
    pub explanation: String,
}

impl Default for MockClient {
    fn default() -> Self {
        Self {
            summary: "Mock summary (test mode).".to_string(),
            explanation: "Mock sentiment (test mode).".to_string(),
        }
    }
}

#[async_trait]
impl EnrichClient for MockClient {
    fn is_configured(&self) -> bool {
        true
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
    async fn summarize(&self, _item: &NewsItem) -> String {
        self.summary.clone()
    }
    async fn judge_sentiment(&self, headlines: &[String]) -> Option<SentimentJudgment> {
        if headlines.is_empty() {
            return None;
        }
        Some(SentimentJudgment {
            label: SentimentLabel::Neutral,
            explanation: self.explanation.clone(),
        })
    }
    async fn market_overview(&self, headlines: &[String]) -> Option<String> {
        if headlines.is_empty() {
            return None;
        }
        Some(format!("Market overview across {} headlines.", headlines.len()))
    }
}

/// Strip a leading/trailing markdown code fence, tolerating a `json` tag.
fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}

/// Trim, strip fences and cap a raw model reply.
pub fn clean_reply(raw: &str) -> String {
    let text = strip_code_fences(raw);
    text.chars().take(MAX_REPLY_CHARS).collect()
}

/// Parse the JSON shape the sentiment prompt asks for. Missing fields fall
/// back to Neutral / empty; a non-JSON reply is an error for the caller to
/// convert into a marker judgment.
pub fn parse_sentiment_reply(raw: &str) -> Result<SentimentJudgment> {
    #[derive(Deserialize)]
    struct Reply {
        overall_sentiment: Option<String>,
        one_sentence_explanation: Option<String>,
    }

    let body = strip_code_fences(raw);
    let reply: Reply = serde_json::from_str(body).context("sentiment reply is not valid JSON")?;
    let label = match reply.overall_sentiment.as_deref().map(str::trim) {
        Some(s) if s.eq_ignore_ascii_case("positive") => SentimentLabel::Positive,
        Some(s) if s.eq_ignore_ascii_case("negative") => SentimentLabel::Negative,
        _ => SentimentLabel::Neutral,
    };
    Ok(SentimentJudgment {
        label,
        explanation: reply.one_sentence_explanation.unwrap_or_default(),
    })
}
