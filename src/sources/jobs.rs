// src/sources/jobs.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::model::JobListing;
use crate::sources::request_failure_reason;
use crate::sources::types::{JobsSource, SourceResult};

#[derive(Debug, Deserialize)]
struct JobsEnvelope {
    #[serde(default)]
    jobs: Vec<Job>,
}

#[derive(Debug, Deserialize)]
struct Job {
    title: Option<String>,
    company_name: Option<String>,
    url: Option<String>,
}

/// Remote-jobs feed client, truncated to the configured listing count.
pub struct JobsClient {
    base: String,
    limit: u32,
    client: reqwest::Client,
}

impl JobsClient {
    pub fn new(base: impl Into<String>, limit: u32, client: reqwest::Client) -> Self {
        Self {
            base: base.into(),
            limit,
            client,
        }
    }

    async fn fetch_jobs(&self) -> Result<Vec<JobListing>> {
        let url = format!("{}/api/remote-jobs?limit={}", self.base, self.limit);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!(request_failure_reason(&e)))?;
        let resp = resp
            .error_for_status()
            .map_err(|e| anyhow!("http status {}", e.status().map(|s| s.as_u16()).unwrap_or(0)))?;
        let body = resp.text().await.context("reading jobs body")?;
        parse_jobs(&body, self.limit as usize)
    }
}

/// Decode the `jobs` array. An empty array is a valid value (no open
/// listings), not a failure.
pub fn parse_jobs(body: &str, limit: usize) -> Result<Vec<JobListing>> {
    let envelope: JobsEnvelope = serde_json::from_str(body).context("malformed response")?;
    Ok(envelope
        .jobs
        .into_iter()
        .take(limit)
        .map(|j| JobListing {
            title: j.title.unwrap_or_default(),
            company: j.company_name.unwrap_or_default(),
            url: j.url.unwrap_or_default(),
        })
        .collect())
}

#[async_trait]
impl JobsSource for JobsClient {
    async fn latest(&self) -> SourceResult<Vec<JobListing>> {
        let t0 = std::time::Instant::now();
        let out = SourceResult::from(self.fetch_jobs().await);
        histogram!("source_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        if out.is_unavailable() {
            counter!("source_fetch_errors_total").increment(1);
        }
        out
    }
}
