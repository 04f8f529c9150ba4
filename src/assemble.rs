//! Snapshot assembler: one pass over every source adapter plus optional
//! enrichment, folded into an immutable [`Snapshot`]. A source that fails
//! degrades to an empty list; the cycle itself never fails.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::config::AppConfig;
use crate::enrich::{build_enrich_client, DynEnrichClient, SUMMARY_UNAVAILABLE};
use crate::metrics::ensure_metrics_described;
use crate::model::{
    AlertDirection, AlertEvent, JobListing, NewsItem, NewsSummary, PricePoint, SentimentJudgment,
    Snapshot,
};
use crate::sources::commodity::CommodityClient;
use crate::sources::crypto::CryptoPriceClient;
use crate::sources::equity::PriceHistoryClient;
use crate::sources::http_client;
use crate::sources::jobs::JobsClient;
use crate::sources::news::NewsClient;
use crate::sources::types::{
    CommoditySource, CryptoSource, JobsSource, NewsSource, PriceSource, SourceResult,
};

/// The adapters one snapshot draws from. Trait objects so tests can swap in
/// scripted providers.
pub struct Sources {
    pub prices: Arc<dyn PriceSource>,
    pub crypto: Arc<dyn CryptoSource>,
    pub news: Arc<dyn NewsSource>,
    pub jobs: Arc<dyn JobsSource>,
    pub fuel: Arc<dyn CommoditySource>,
    pub food: Arc<dyn CommoditySource>,
}

pub struct Assembler {
    cfg: AppConfig,
    sources: Sources,
    enrich: DynEnrichClient,
}

impl Assembler {
    pub fn new(cfg: AppConfig, sources: Sources, enrich: DynEnrichClient) -> Self {
        ensure_metrics_described();
        Self {
            cfg,
            sources,
            enrich,
        }
    }

    /// Wire up the real providers from config.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let client = http_client(Duration::from_secs(cfg.http_timeout_secs));
        let sources = Sources {
            prices: Arc::new(PriceHistoryClient::new(
                cfg.equity_base.clone(),
                client.clone(),
            )),
            crypto: Arc::new(CryptoPriceClient::new(
                cfg.crypto_base.clone(),
                client.clone(),
            )),
            news: Arc::new(NewsClient::new(
                cfg.news_base.clone(),
                cfg.news_api_key.clone(),
                cfg.news_page_size,
                client.clone(),
            )),
            jobs: Arc::new(JobsClient::new(
                cfg.jobs_base.clone(),
                cfg.jobs_limit,
                client.clone(),
            )),
            fuel: Arc::new(CommodityClient::fuel(cfg.fuel_endpoint.clone(), client.clone())),
            food: Arc::new(CommodityClient::food(cfg.food_endpoint.clone(), client)),
        };
        let enrich = build_enrich_client(cfg);
        Self::new(cfg.clone(), sources, enrich)
    }

    /// Build one complete snapshot. Category fetches run concurrently; a
    /// category that comes back `Unavailable` contributes its empty default.
    pub async fn assemble(&self) -> Snapshot {
        let started = std::time::Instant::now();

        let (equities, indices, crypto, news, jobs, fuel, food) = tokio::join!(
            self.fetch_equities(),
            self.fetch_indices(),
            self.fetch_crypto(),
            self.fetch_news(),
            self.fetch_jobs(),
            self.sources.fuel.prices(),
            self.sources.food.prices(),
        );

        let (news_summaries, sentiment, market_overview) = self.enrich_news(&news).await;

        // Alerts track the configured tickers only, not indices or crypto.
        let alerts = alerts_from(&equities, self.cfg.alert_threshold_pct);

        let snapshot = Snapshot {
            equities,
            indices,
            crypto,
            fuel,
            food,
            news: news_summaries,
            sentiment,
            market_overview,
            jobs,
            alerts,
            generated_at: Utc::now(),
        };

        tracing::info!(
            equities = snapshot.equities.len(),
            indices = snapshot.indices.len(),
            crypto = snapshot.crypto.len(),
            news = snapshot.news.len(),
            jobs = snapshot.jobs.len(),
            alerts = snapshot.alerts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "snapshot assembled"
        );
        snapshot
    }

    async fn fetch_equities(&self) -> Vec<PricePoint> {
        let mut out = Vec::with_capacity(self.cfg.tickers.len());
        for symbol in &self.cfg.tickers {
            match self.sources.prices.latest_quote(symbol).await {
                SourceResult::Ok(point) => out.push(point),
                SourceResult::Unavailable(reason) => {
                    tracing::warn!(symbol = %symbol, reason = %reason, "equity quote unavailable");
                }
            }
        }
        out
    }

    /// Indices reuse the price-history adapter; the point is relabeled from
    /// the provider symbol to the display name.
    async fn fetch_indices(&self) -> Vec<PricePoint> {
        let mut out = Vec::with_capacity(self.cfg.indices.len());
        for index in &self.cfg.indices {
            match self.sources.prices.latest_quote(&index.symbol).await {
                SourceResult::Ok(mut point) => {
                    point.symbol = index.name.clone();
                    out.push(point);
                }
                SourceResult::Unavailable(reason) => {
                    tracing::warn!(index = %index.name, reason = %reason, "index quote unavailable");
                }
            }
        }
        out
    }

    async fn fetch_crypto(&self) -> Vec<PricePoint> {
        match self.sources.crypto.prices(&self.cfg.crypto_ids).await {
            SourceResult::Ok(points) => points,
            SourceResult::Unavailable(reason) => {
                tracing::warn!(reason = %reason, "crypto prices unavailable");
                Vec::new()
            }
        }
    }

    async fn fetch_news(&self) -> Vec<NewsItem> {
        match self.sources.news.top_headlines().await {
            SourceResult::Ok(items) => items,
            SourceResult::Unavailable(reason) => {
                tracing::warn!(reason = %reason, "headlines unavailable");
                Vec::new()
            }
        }
    }

    async fn fetch_jobs(&self) -> Vec<JobListing> {
        match self.sources.jobs.latest().await {
            SourceResult::Ok(jobs) => jobs,
            SourceResult::Unavailable(reason) => {
                tracing::warn!(reason = %reason, "job listings unavailable");
                Vec::new()
            }
        }
    }

    /// Summaries, batch sentiment and overview. The configuration check
    /// happens once, here: adapters themselves never gate on it.
    async fn enrich_news(
        &self,
        news: &[NewsItem],
    ) -> (Vec<NewsSummary>, Option<SentimentJudgment>, Option<String>) {
        if !self.enrich.is_configured() {
            return (news.iter().map(fallback_summary).collect(), None, None);
        }

        let mut summaries = Vec::with_capacity(news.len());
        for item in news {
            let summary = self.enrich.summarize(item).await;
            summaries.push(NewsSummary {
                title: item.title.clone(),
                url: item.url.clone(),
                summary,
            });
        }

        let headlines: Vec<String> = news.iter().map(|n| n.title.clone()).collect();
        let (sentiment, overview) = tokio::join!(
            self.enrich.judge_sentiment(&headlines),
            self.enrich.market_overview(&headlines),
        );
        (summaries, sentiment, overview)
    }
}

fn fallback_summary(item: &NewsItem) -> NewsSummary {
    let summary = item
        .description
        .clone()
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| SUMMARY_UNAVAILABLE.to_string());
    NewsSummary {
        title: item.title.clone(),
        url: item.url.clone(),
        summary,
    }
}

/// Scan price points for moves at or beyond `threshold` percent (absolute).
/// Points without a computed change never alert.
pub fn alerts_from(points: &[PricePoint], threshold: f64) -> Vec<AlertEvent> {
    points
        .iter()
        .filter_map(|p| {
            let pct = p.percent_change?;
            if pct.abs() < threshold {
                return None;
            }
            let direction = if pct > 0.0 {
                AlertDirection::Up
            } else {
                AlertDirection::Down
            };
            Some(AlertEvent {
                symbol: p.symbol.clone(),
                percent_change: pct,
                direction,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(symbol: &str, pct: Option<f64>) -> PricePoint {
        PricePoint {
            symbol: symbol.to_string(),
            price: 100.0,
            percent_change: pct,
            as_of: Utc::now(),
        }
    }

    #[test]
    fn alert_boundary_is_inclusive_at_threshold() {
        let points = vec![
            point("UP", Some(3.00)),
            point("DOWN", Some(-3.00)),
            point("CALM", Some(2.99)),
            point("FLAT", None),
        ];
        let alerts = alerts_from(&points, 3.0);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].symbol, "UP");
        assert_eq!(alerts[0].direction, AlertDirection::Up);
        assert_eq!(alerts[1].symbol, "DOWN");
        assert_eq!(alerts[1].direction, AlertDirection::Down);
    }

    #[test]
    fn custom_threshold_applies() {
        let alerts = alerts_from(&[point("X", Some(2.5))], 2.0);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].percent_change, 2.5);
    }

    #[test]
    fn fallback_summary_prefers_description() {
        let with_desc = NewsItem {
            title: "t".into(),
            url: "u".into(),
            description: Some("the details".into()),
        };
        assert_eq!(fallback_summary(&with_desc).summary, "the details");

        let without = NewsItem {
            title: "t".into(),
            url: "u".into(),
            description: None,
        };
        assert_eq!(fallback_summary(&without).summary, SUMMARY_UNAVAILABLE);
    }
}
