// src/sources/equity.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::model::PricePoint;
use crate::sources::types::{PriceSource, SourceResult};
use crate::sources::{percent_change, request_failure_reason};

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}
#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}
#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}
#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}
#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}
#[derive(Debug, Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
}

/// Price-history client for the chart endpoint; one instance serves both the
/// equities and indices categories.
pub struct PriceHistoryClient {
    base: String,
    range: String,
    interval: String,
    client: reqwest::Client,
}

impl PriceHistoryClient {
    pub fn new(base: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base: base.into(),
            range: "5d".to_string(),
            interval: "1d".to_string(),
            client,
        }
    }

    async fn fetch_chart(&self, symbol: &str) -> Result<PricePoint> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}",
            self.base, symbol, self.range, self.interval
        );
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!(request_failure_reason(&e)))?;
        let resp = resp
            .error_for_status()
            .map_err(|e| anyhow!("http status {}", e.status().map(|s| s.as_u16()).unwrap_or(0)))?;
        let body = resp.text().await.context("reading chart body")?;
        parse_chart(symbol, &body)
    }
}

/// Decode the provider's chart JSON into the latest close plus percent
/// change. Two usable closes give a change; exactly one still yields the
/// price with `percent_change: None`; none is an empty payload.
pub fn parse_chart(symbol: &str, body: &str) -> Result<PricePoint> {
    let envelope: ChartEnvelope = serde_json::from_str(body).context("malformed response")?;
    if let Some(err) = envelope.chart.error {
        return Err(anyhow!("provider error {}: {}", err.code, err.description));
    }
    let result = envelope
        .chart
        .result
        .and_then(|mut v| if v.is_empty() { None } else { Some(v.remove(0)) })
        .ok_or_else(|| anyhow!("empty payload"))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("empty payload"))?;

    // Close series comes null-padded on non-trading days; keep real closes
    // paired with their timestamps.
    let mut observations: Vec<(Option<i64>, f64)> = Vec::new();
    for (i, close) in quote.close.unwrap_or_default().into_iter().enumerate() {
        if let Some(px) = close {
            if px.is_finite() {
                observations.push((timestamps.get(i).copied(), px));
            }
        }
    }

    let (last_ts, latest) = *observations.last().ok_or_else(|| anyhow!("empty payload"))?;
    let pct = if observations.len() >= 2 {
        percent_change(observations[observations.len() - 2].1, latest)
    } else {
        None
    };
    let as_of = last_ts
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);

    Ok(PricePoint {
        symbol: symbol.to_string(),
        price: latest,
        percent_change: pct,
        as_of,
    })
}

#[async_trait]
impl PriceSource for PriceHistoryClient {
    async fn latest_quote(&self, symbol: &str) -> SourceResult<PricePoint> {
        let t0 = std::time::Instant::now();
        let out = SourceResult::from(self.fetch_chart(symbol).await);
        histogram!("source_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        if out.is_unavailable() {
            counter!("source_fetch_errors_total").increment(1);
        }
        out
    }
}
