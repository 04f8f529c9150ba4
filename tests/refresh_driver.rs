// tests/refresh_driver.rs
//
// Runs the refresh loop over scripted sources at a short cadence and checks
// the publish and cache side effects plus generated_at monotonicity.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use market_pulse::assemble::{Assembler, Sources};
use market_pulse::cache::NewsCache;
use market_pulse::config::AppConfig;
use market_pulse::enrich::DisabledClient;
use market_pulse::model::{JobListing, NewsItem, PricePoint};
use market_pulse::refresh::{spawn_refresh_driver, RefreshCfg};
use market_pulse::sources::commodity::CommodityClient;
use market_pulse::sources::types::{
    CryptoSource, JobsSource, NewsSource, PriceSource, SourceResult,
};
use market_pulse::store::SnapshotStore;

struct NoQuotes;

#[async_trait]
impl PriceSource for NoQuotes {
    async fn latest_quote(&self, _symbol: &str) -> SourceResult<PricePoint> {
        SourceResult::Unavailable("offline test".to_string())
    }
}

struct NoCrypto;

#[async_trait]
impl CryptoSource for NoCrypto {
    async fn prices(&self, _ids: &[String]) -> SourceResult<Vec<PricePoint>> {
        SourceResult::Ok(Vec::new())
    }
}

struct OneArticle;

#[async_trait]
impl NewsSource for OneArticle {
    async fn top_headlines(&self) -> SourceResult<Vec<NewsItem>> {
        SourceResult::Ok(vec![NewsItem {
            title: "Single headline".to_string(),
            url: "https://news.example/only".to_string(),
            description: Some("One article per tick.".to_string()),
        }])
    }
}

struct NoJobs;

#[async_trait]
impl JobsSource for NoJobs {
    async fn latest(&self) -> SourceResult<Vec<JobListing>> {
        SourceResult::Ok(Vec::new())
    }
}

fn offline_assembler() -> Assembler {
    let mut cfg = AppConfig::default();
    cfg.tickers = Vec::new();
    cfg.indices = Vec::new();
    cfg.crypto_ids = Vec::new();

    let sources = Sources {
        prices: Arc::new(NoQuotes),
        crypto: Arc::new(NoCrypto),
        news: Arc::new(OneArticle),
        jobs: Arc::new(NoJobs),
        fuel: Arc::new(CommodityClient::fuel(None, reqwest::Client::new())),
        food: Arc::new(CommodityClient::food(None, reqwest::Client::new())),
    };
    Assembler::new(cfg, sources, Arc::new(DisabledClient))
}

#[tokio::test]
async fn driver_publishes_and_persists_every_tick() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = Arc::new(NewsCache::new(dir.path().join("latest_news.json")));
    let store = SnapshotStore::new();

    let handle = spawn_refresh_driver(
        Arc::new(offline_assembler()),
        store.clone(),
        cache.clone(),
        RefreshCfg { interval_ms: 10 },
    );

    tokio::time::sleep(Duration::from_millis(80)).await;
    handle.abort();

    let snapshot = store.latest().expect("at least one cycle published");
    assert_eq!(snapshot.news.len(), 1);
    assert_eq!(snapshot.news[0].summary, "One article per tick.");
    assert_eq!(snapshot.fuel.get("Diesel"), Some(&97.8), "static fallback");
    assert!(snapshot.equities.is_empty());

    let cached = cache.load().expect("cache file written");
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].title, "Single headline");
}

#[tokio::test]
async fn generated_at_never_moves_backwards() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = Arc::new(NewsCache::new(dir.path().join("latest_news.json")));
    let store = SnapshotStore::new();

    let handle = spawn_refresh_driver(
        Arc::new(offline_assembler()),
        store.clone(),
        cache,
        RefreshCfg { interval_ms: 5 },
    );

    tokio::time::sleep(Duration::from_millis(40)).await;
    let first = store.latest().expect("first sample").generated_at;
    tokio::time::sleep(Duration::from_millis(40)).await;
    let second = store.latest().expect("second sample").generated_at;
    handle.abort();

    assert!(second >= first, "{second} should not precede {first}");
}
