// src/sources/commodity.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::Lazy;

use crate::model::CommodityTable;
use crate::sources::request_failure_reason;
use crate::sources::types::CommoditySource;

/// Static fuel defaults served when no live endpoint is configured (or a
/// configured one fails).
pub static FUEL_DEFAULTS: Lazy<CommodityTable> = Lazy::new(|| {
    CommodityTable::from([
        ("Petrol".to_string(), 110.5),
        ("Diesel".to_string(), 97.8),
        ("Crude Oil (USD/barrel)".to_string(), 85.3),
    ])
});

/// Static food defaults, same contract as [`FUEL_DEFAULTS`].
pub static FOOD_DEFAULTS: Lazy<CommodityTable> = Lazy::new(|| {
    CommodityTable::from([
        ("Wheat (kg)".to_string(), 45.5),
        ("Rice (kg)".to_string(), 60.2),
        ("Milk (liter)".to_string(), 55.0),
        ("Egg (pc)".to_string(), 6.5),
    ])
});

/// Live endpoint for one commodity table; the credential is optional.
#[derive(Debug, Clone)]
pub struct CommodityEndpoint {
    pub url: String,
    pub api_key: Option<String>,
}

/// Commodity-proxy adapter. Unlike the other sources it never reports
/// `Unavailable`: the static table is the documented degraded value.
pub struct CommodityClient {
    label: &'static str,
    endpoint: Option<CommodityEndpoint>,
    fallback: CommodityTable,
    client: reqwest::Client,
}

impl CommodityClient {
    pub fn fuel(endpoint: Option<CommodityEndpoint>, client: reqwest::Client) -> Self {
        Self {
            label: "fuel",
            endpoint,
            fallback: FUEL_DEFAULTS.clone(),
            client,
        }
    }

    pub fn food(endpoint: Option<CommodityEndpoint>, client: reqwest::Client) -> Self {
        Self {
            label: "food",
            endpoint,
            fallback: FOOD_DEFAULTS.clone(),
            client,
        }
    }

    async fn fetch_live(&self, endpoint: &CommodityEndpoint) -> Result<CommodityTable> {
        let mut req = self.client.get(&endpoint.url);
        if let Some(key) = &endpoint.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| anyhow!(request_failure_reason(&e)))?;
        let resp = resp
            .error_for_status()
            .map_err(|e| anyhow!("http status {}", e.status().map(|s| s.as_u16()).unwrap_or(0)))?;
        let body = resp.text().await.context("reading commodity body")?;
        parse_table(&body)
    }
}

/// Decode a flat `name -> price` object. An empty object falls back to the
/// static table like any other failure.
pub fn parse_table(body: &str) -> Result<CommodityTable> {
    let table: CommodityTable = serde_json::from_str(body).context("malformed response")?;
    if table.is_empty() {
        return Err(anyhow!("empty payload"));
    }
    Ok(table)
}

#[async_trait]
impl CommoditySource for CommodityClient {
    async fn prices(&self) -> CommodityTable {
        let Some(endpoint) = &self.endpoint else {
            return self.fallback.clone();
        };
        let t0 = std::time::Instant::now();
        let fetched = self.fetch_live(endpoint).await;
        histogram!("source_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        match fetched {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(table = self.label, error = %e, "live commodity fetch failed, serving static defaults");
                counter!("source_fetch_errors_total").increment(1);
                self.fallback.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_tables_match_documented_defaults() {
        assert_eq!(FUEL_DEFAULTS.get("Petrol"), Some(&110.5));
        assert_eq!(FUEL_DEFAULTS.get("Diesel"), Some(&97.8));
        assert_eq!(FUEL_DEFAULTS.get("Crude Oil (USD/barrel)"), Some(&85.3));
        assert_eq!(FOOD_DEFAULTS.len(), 4);
        assert_eq!(FOOD_DEFAULTS.get("Egg (pc)"), Some(&6.5));
    }

    #[test]
    fn parse_table_rejects_empty_objects() {
        assert!(parse_table("{}").is_err());
        let table = parse_table(r#"{"Petrol": 111.0}"#).unwrap();
        assert_eq!(table.get("Petrol"), Some(&111.0));
    }
}
