// src/enrich/gemini.rs
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::enrich::{clean_reply, error_marker, parse_sentiment_reply, EnrichClient};
use crate::model::{NewsItem, SentimentJudgment, SentimentLabel};
use crate::sources::request_failure_reason;

/// Google Gemini `generateContent` provider. Construction implies a key is
/// present; the unconfigured path lives in [`crate::enrich::DisabledClient`].
pub struct GeminiClient {
    base: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ReplyPart>>,
}

#[derive(Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(
        base: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base: base.into(),
            model: model.into(),
            api_key: api_key.into(),
            client,
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        counter!("enrich_calls_total").increment(1);
        let out = self.generate_inner(prompt).await;
        if out.is_err() {
            counter!("enrich_errors_total").increment(1);
        }
        out
    }

    async fn generate_inner(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base, self.model, self.api_key
        );
        let req = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 512,
            },
        };

        let resp = self
            .client
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| anyhow!(request_failure_reason(&e)))?;
        let resp = resp
            .error_for_status()
            .map_err(|e| anyhow!("http status {}", e.status().map(|s| s.as_u16()).unwrap_or(0)))?;
        let body: GenerateResponse = resp.json().await.context("decoding model reply")?;

        let text: String = body
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        let cleaned = clean_reply(&text);
        if cleaned.is_empty() {
            bail!("empty reply");
        }
        Ok(cleaned)
    }
}

fn summary_prompt(title: &str, description: &str) -> String {
    format!(
        "Summarize the following news article in 2 short lines for a technical finance audience:\n\nTitle: {title}\nDescription: {description}"
    )
}

fn sentiment_prompt(headlines: &[String]) -> String {
    let mut prompt = String::from(
        "Read these news headlines and answer in JSON with fields: overall_sentiment (Positive/Neutral/Negative) and one_sentence_explanation.\n\nHeadlines:\n",
    );
    for headline in headlines {
        prompt.push_str("- ");
        prompt.push_str(headline);
        prompt.push('\n');
    }
    prompt.push_str("\nAnswer concisely.");
    prompt
}

fn overview_prompt(headlines: &[String]) -> String {
    let mut prompt = String::from(
        "Using the following headlines, give a concise 3-line market summary mentioning stocks, commodities or risks:\n",
    );
    for headline in headlines {
        prompt.push_str("- ");
        prompt.push_str(headline);
        prompt.push('\n');
    }
    prompt
}

#[async_trait]
impl EnrichClient for GeminiClient {
    fn is_configured(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    async fn summarize(&self, item: &NewsItem) -> String {
        let description = item.description.as_deref().unwrap_or("");
        match self.generate(&summary_prompt(&item.title, description)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(title = %item.title, error = %e, "summary generation failed");
                error_marker(&format!("{e:#}"))
            }
        }
    }

    async fn judge_sentiment(&self, headlines: &[String]) -> Option<SentimentJudgment> {
        if headlines.is_empty() {
            return None;
        }
        match self.generate(&sentiment_prompt(headlines)).await {
            Ok(text) => match parse_sentiment_reply(&text) {
                Ok(judgment) => Some(judgment),
                Err(e) => {
                    counter!("enrich_errors_total").increment(1);
                    tracing::warn!(error = %e, "sentiment reply did not parse");
                    Some(SentimentJudgment {
                        label: SentimentLabel::Neutral,
                        explanation: error_marker(&format!("{e:#}")),
                    })
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "sentiment generation failed");
                Some(SentimentJudgment {
                    label: SentimentLabel::Neutral,
                    explanation: error_marker(&format!("{e:#}")),
                })
            }
        }
    }

    async fn market_overview(&self, headlines: &[String]) -> Option<String> {
        if headlines.is_empty() {
            return None;
        }
        match self.generate(&overview_prompt(headlines)).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(error = %e, "overview generation failed");
                Some(error_marker(&format!("{e:#}")))
            }
        }
    }
}
