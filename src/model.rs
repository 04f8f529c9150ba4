//! Canonical types shared by adapters, assembler, cache and API.
//!
//! Every provider-specific shape is decoded inside its adapter; the rest of
//! the pipeline only ever sees these types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest observation for one priced instrument (equity, index or crypto id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Ticker for equities/crypto, display name for indices.
    pub symbol: String,
    pub price: f64,
    /// Change vs the previous close, in percent. `None` when the series had
    /// fewer than two usable observations.
    pub percent_change: Option<f64>,
    pub as_of: DateTime<Utc>,
}

/// One article as returned by the news provider, already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
}

/// Presentable news entry. `summary` holds the AI synopsis when enrichment
/// ran, otherwise the article description or a fixed placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSummary {
    pub title: String,
    pub url: String,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// One aggregate judgment over the whole headline batch, never per article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentJudgment {
    pub label: SentimentLabel,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub url: String,
}

/// Commodity name → price. BTreeMap keeps iteration (and JSON) deterministic.
pub type CommodityTable = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    Up,
    Down,
}

/// Emitted when an equity moved at least the configured threshold
/// (inclusive) vs its previous close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub symbol: String,
    pub percent_change: f64,
    pub direction: AlertDirection,
}

/// One complete refresh cycle, immutable once built.
///
/// List fields are empty (never absent) when their source was unavailable;
/// `sentiment` and `market_overview` are `None` when enrichment is
/// unconfigured or there were no headlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub equities: Vec<PricePoint>,
    pub indices: Vec<PricePoint>,
    pub crypto: Vec<PricePoint>,
    pub fuel: CommodityTable,
    pub food: CommodityTable,
    pub news: Vec<NewsSummary>,
    pub sentiment: Option<SentimentJudgment>,
    pub market_overview: Option<String>,
    pub jobs: Vec<JobListing>,
    pub alerts: Vec<AlertEvent>,
    pub generated_at: DateTime<Utc>,
}
