// tests/assemble_scenarios.rs
//
// Whole-cycle assembler behavior over scripted sources. Each scenario checks
// that provider failures degrade a category without ever losing the cycle.
//
// Covered:
// - commodity endpoint unconfigured -> documented static tables
// - 3 articles + working enrichment -> 3 summaries, one batch sentiment
// - one failing ticker -> omitted, remaining symbols still assemble + alert
// - enrichment disabled -> description fallback, no sentiment/overview
// - empty headline batch -> no sentiment even when enrichment works
// - index points relabeled to display names

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use market_pulse::assemble::{Assembler, Sources};
use market_pulse::config::{AppConfig, IndexSpec};
use market_pulse::enrich::{DisabledClient, MockClient, SUMMARY_UNAVAILABLE};
use market_pulse::model::{JobListing, NewsItem, PricePoint, SentimentLabel};
use market_pulse::sources::commodity::{CommodityClient, FOOD_DEFAULTS, FUEL_DEFAULTS};
use market_pulse::sources::types::{
    CryptoSource, JobsSource, NewsSource, PriceSource, SourceResult,
};

struct ScriptedPrices {
    quotes: HashMap<String, SourceResult<PricePoint>>,
}

#[async_trait]
impl PriceSource for ScriptedPrices {
    async fn latest_quote(&self, symbol: &str) -> SourceResult<PricePoint> {
        self.quotes
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| SourceResult::Unavailable("no quote scripted".to_string()))
    }
}

struct ScriptedCrypto(SourceResult<Vec<PricePoint>>);

#[async_trait]
impl CryptoSource for ScriptedCrypto {
    async fn prices(&self, _ids: &[String]) -> SourceResult<Vec<PricePoint>> {
        self.0.clone()
    }
}

struct ScriptedNews(SourceResult<Vec<NewsItem>>);

#[async_trait]
impl NewsSource for ScriptedNews {
    async fn top_headlines(&self) -> SourceResult<Vec<NewsItem>> {
        self.0.clone()
    }
}

struct ScriptedJobs(SourceResult<Vec<JobListing>>);

#[async_trait]
impl JobsSource for ScriptedJobs {
    async fn latest(&self) -> SourceResult<Vec<JobListing>> {
        self.0.clone()
    }
}

fn point(symbol: &str, price: f64, pct: Option<f64>) -> PricePoint {
    PricePoint {
        symbol: symbol.to_string(),
        price,
        percent_change: pct,
        as_of: Utc::now(),
    }
}

fn article(title: &str, url: &str, description: Option<&str>) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        url: url.to_string(),
        description: description.map(str::to_string),
    }
}

fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.tickers = Vec::new();
    cfg.indices = Vec::new();
    cfg.crypto_ids = vec!["bitcoin".to_string()];
    cfg
}

fn scripted_sources(
    quotes: HashMap<String, SourceResult<PricePoint>>,
    news: SourceResult<Vec<NewsItem>>,
) -> Sources {
    Sources {
        prices: Arc::new(ScriptedPrices { quotes }),
        crypto: Arc::new(ScriptedCrypto(SourceResult::Ok(Vec::new()))),
        news: Arc::new(ScriptedNews(news)),
        jobs: Arc::new(ScriptedJobs(SourceResult::Ok(Vec::new()))),
        fuel: Arc::new(CommodityClient::fuel(None, reqwest::Client::new())),
        food: Arc::new(CommodityClient::food(None, reqwest::Client::new())),
    }
}

#[tokio::test]
async fn unconfigured_commodity_endpoints_serve_static_defaults() {
    let sources = scripted_sources(HashMap::new(), SourceResult::Ok(Vec::new()));
    let assembler = Assembler::new(test_config(), sources, Arc::new(DisabledClient));

    let snapshot = assembler.assemble().await;

    assert_eq!(snapshot.fuel, *FUEL_DEFAULTS);
    assert_eq!(snapshot.food, *FOOD_DEFAULTS);
    assert_eq!(snapshot.fuel.get("Petrol"), Some(&110.5));
    assert_eq!(snapshot.fuel.get("Crude Oil (USD/barrel)"), Some(&85.3));
}

#[tokio::test]
async fn three_articles_yield_three_summaries_and_one_batch_sentiment() {
    let articles = vec![
        article("Rates hold", "https://news.example/1", Some("desc one")),
        article("Oil slips", "https://news.example/2", None),
        article("Chips rally", "https://news.example/3", Some("desc three")),
    ];
    let sources = scripted_sources(HashMap::new(), SourceResult::Ok(articles));
    let assembler = Assembler::new(test_config(), sources, Arc::new(MockClient::default()));

    let snapshot = assembler.assemble().await;

    assert_eq!(snapshot.news.len(), 3);
    assert!(
        snapshot.news.iter().all(|s| !s.summary.is_empty()),
        "every article gets some summary text"
    );
    let sentiment = snapshot.sentiment.expect("one judgment across the batch");
    assert_eq!(sentiment.label, SentimentLabel::Neutral);
    assert!(snapshot.market_overview.is_some());
}

#[tokio::test]
async fn failing_ticker_is_omitted_while_the_rest_assemble() {
    let mut cfg = test_config();
    cfg.tickers = vec!["AAPL".to_string(), "MSFT".to_string(), "GOOGL".to_string()];

    let mut quotes = HashMap::new();
    quotes.insert(
        "AAPL".to_string(),
        SourceResult::Ok(point("AAPL", 232.9, Some(3.2))),
    );
    quotes.insert("MSFT".to_string(), SourceResult::Unavailable("timeout".to_string()));
    quotes.insert(
        "GOOGL".to_string(),
        SourceResult::Ok(point("GOOGL", 199.1, Some(-1.2))),
    );

    let mut sources = scripted_sources(quotes, SourceResult::Ok(Vec::new()));
    sources.crypto = Arc::new(ScriptedCrypto(SourceResult::Ok(vec![point(
        "bitcoin", 64250.12, None,
    )])));
    sources.jobs = Arc::new(ScriptedJobs(SourceResult::Ok(vec![JobListing {
        title: "Platform Engineer".to_string(),
        company: "Initech".to_string(),
        url: "https://jobs.example/1".to_string(),
    }])));

    let assembler = Assembler::new(cfg, sources, Arc::new(DisabledClient));
    let snapshot = assembler.assemble().await;

    assert_eq!(snapshot.equities.len(), 2, "failed symbol drops out");
    assert!(snapshot.equities.iter().all(|p| p.symbol != "MSFT"));
    assert_eq!(snapshot.crypto.len(), 1);
    assert_eq!(snapshot.jobs.len(), 1);

    // Only the +3.2% move crosses the default threshold.
    assert_eq!(snapshot.alerts.len(), 1);
    assert_eq!(snapshot.alerts[0].symbol, "AAPL");
}

#[tokio::test]
async fn disabled_enrichment_falls_back_to_descriptions() {
    let articles = vec![
        article("Has detail", "https://news.example/a", Some("the description")),
        article("Bare headline", "https://news.example/b", None),
    ];
    let sources = scripted_sources(HashMap::new(), SourceResult::Ok(articles));
    let assembler = Assembler::new(test_config(), sources, Arc::new(DisabledClient));

    let snapshot = assembler.assemble().await;

    assert_eq!(snapshot.news.len(), 2);
    assert_eq!(snapshot.news[0].summary, "the description");
    assert_eq!(snapshot.news[1].summary, SUMMARY_UNAVAILABLE);
    assert!(snapshot.sentiment.is_none());
    assert!(snapshot.market_overview.is_none());
}

#[tokio::test]
async fn empty_headline_batch_never_gets_a_sentiment() {
    let sources = scripted_sources(HashMap::new(), SourceResult::Ok(Vec::new()));
    let assembler = Assembler::new(test_config(), sources, Arc::new(MockClient::default()));

    let snapshot = assembler.assemble().await;

    assert!(snapshot.news.is_empty());
    assert!(snapshot.sentiment.is_none());
    assert!(snapshot.market_overview.is_none());
}

#[tokio::test]
async fn unavailable_news_degrades_to_an_empty_panel() {
    let sources = scripted_sources(
        HashMap::new(),
        SourceResult::Unavailable("NEWS_API_KEY not configured".to_string()),
    );
    let assembler = Assembler::new(test_config(), sources, Arc::new(MockClient::default()));

    let snapshot = assembler.assemble().await;

    assert!(snapshot.news.is_empty());
    assert!(snapshot.sentiment.is_none());
}

#[tokio::test]
async fn index_points_carry_display_names() {
    let mut cfg = test_config();
    cfg.indices = vec![IndexSpec::new("S&P 500", "^GSPC")];

    let mut quotes = HashMap::new();
    quotes.insert(
        "^GSPC".to_string(),
        SourceResult::Ok(point("^GSPC", 5601.4, Some(0.4))),
    );
    let sources = scripted_sources(quotes, SourceResult::Ok(Vec::new()));
    let assembler = Assembler::new(cfg, sources, Arc::new(DisabledClient));

    let snapshot = assembler.assemble().await;

    assert_eq!(snapshot.indices.len(), 1);
    assert_eq!(snapshot.indices[0].symbol, "S&P 500");
    assert_eq!(snapshot.indices[0].price, 5601.4);
}
