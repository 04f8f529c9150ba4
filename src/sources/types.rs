// src/sources/types.rs
use async_trait::async_trait;

use crate::model::{CommodityTable, JobListing, NewsItem, PricePoint};

/// Outcome of one adapter call. A provider failure is a value carrying the
/// reason; no error type ever crosses the adapter boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceResult<T> {
    Ok(T),
    Unavailable(String),
}

impl<T> SourceResult<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, SourceResult::Ok(_))
    }

    pub fn is_unavailable(&self) -> bool {
        !self.is_ok()
    }
}

impl<T> From<anyhow::Result<T>> for SourceResult<T> {
    fn from(res: anyhow::Result<T>) -> Self {
        match res {
            Ok(v) => SourceResult::Ok(v),
            Err(e) => SourceResult::Unavailable(format!("{e:#}")),
        }
    }
}

/// Price history lookup, shared by the equities and indices adapter
/// instances (same endpoint, different symbol sets).
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Latest close for `symbol` with percent change vs the previous close.
    async fn latest_quote(&self, symbol: &str) -> SourceResult<PricePoint>;
}

#[async_trait]
pub trait CryptoSource: Send + Sync {
    /// Current USD price per id, emitted in the order the ids were given.
    async fn prices(&self, ids: &[String]) -> SourceResult<Vec<PricePoint>>;
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn top_headlines(&self) -> SourceResult<Vec<NewsItem>>;
}

#[async_trait]
pub trait JobsSource: Send + Sync {
    async fn latest(&self) -> SourceResult<Vec<JobListing>>;
}

/// Commodity tables always resolve: without a live endpoint (or when it
/// fails) the adapter serves its static defaults, which is a legitimate
/// value rather than a failure.
#[async_trait]
pub trait CommoditySource: Send + Sync {
    async fn prices(&self) -> CommodityTable;
}
