// src/sources/crypto.rs
use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use metrics::{counter, histogram};

use crate::model::PricePoint;
use crate::sources::request_failure_reason;
use crate::sources::types::{CryptoSource, SourceResult};

/// Spot-price client for the simple-price endpoint (`id -> {currency: px}`).
pub struct CryptoPriceClient {
    base: String,
    client: reqwest::Client,
}

impl CryptoPriceClient {
    pub fn new(base: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base: base.into(),
            client,
        }
    }

    async fn fetch_prices(&self, ids: &[String]) -> Result<Vec<PricePoint>> {
        let url = format!(
            "{}/api/v3/simple/price?ids={}&vs_currencies=usd",
            self.base,
            ids.join(",")
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
        let body = resp.text().await.context("reading price body")?;
        parse_simple_price(ids, &body)
    }
}

/// Decode the `id -> {currency: price}` map, keeping the configured id
/// order. Ids the provider did not price are skipped; an empty map is an
/// empty payload.
///
/// The endpoint returns a single observation per id, so `percent_change`
/// stays `None` (fewer than two observations).
pub fn parse_simple_price(ids: &[String], body: &str) -> Result<Vec<PricePoint>> {
    let table: HashMap<String, HashMap<String, f64>> =
        serde_json::from_str(body).context("malformed response")?;
    if table.is_empty() {
        return Err(anyhow!("empty payload"));
    }

    let now = Utc::now();
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(price) = table.get(id).and_then(|cur| cur.get("usd")).copied() {
            out.push(PricePoint {
                symbol: id.clone(),
                price,
                percent_change: None,
                as_of: now,
            });
        }
    }
    Ok(out)
}

#[async_trait]
impl CryptoSource for CryptoPriceClient {
    async fn prices(&self, ids: &[String]) -> SourceResult<Vec<PricePoint>> {
        let t0 = std::time::Instant::now();
        let out = SourceResult::from(self.fetch_prices(ids).await);
        histogram!("source_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        if out.is_unavailable() {
            counter!("source_fetch_errors_total").increment(1);
        }
        out
    }
}
