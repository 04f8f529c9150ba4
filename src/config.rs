// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::sources::commodity::CommodityEndpoint;

const ENV_CONFIG_PATH: &str = "DASHBOARD_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";

/// One tracked market index: display name plus the provider symbol.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    pub symbol: String,
}

impl IndexSpec {
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

/// Runtime configuration. Precedence: built-in defaults, then the optional
/// TOML file, then environment variables. Secrets only come from env.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tickers: Vec<String>,
    pub indices: Vec<IndexSpec>,
    pub crypto_ids: Vec<String>,
    pub news_api_key: Option<String>,
    pub news_page_size: u32,
    pub jobs_limit: u32,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub fuel_endpoint: Option<CommodityEndpoint>,
    pub food_endpoint: Option<CommodityEndpoint>,
    pub refresh_interval_ms: u64,
    pub alert_threshold_pct: f64,
    pub http_timeout_secs: u64,
    pub summary_file: PathBuf,
    pub bind_addr: String,
    pub equity_base: String,
    pub crypto_base: String,
    pub news_base: String,
    pub jobs_base: String,
    pub gemini_base: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tickers: vec![
                "AAPL".to_string(),
                "MSFT".to_string(),
                "GOOGL".to_string(),
            ],
            indices: vec![
                IndexSpec::new("S&P 500", "^GSPC"),
                IndexSpec::new("NASDAQ", "^IXIC"),
                IndexSpec::new("NIKKEI 225", "^N225"),
                IndexSpec::new("NIFTY 50", "^NSEI"),
            ],
            crypto_ids: vec![
                "bitcoin".to_string(),
                "ethereum".to_string(),
                "solana".to_string(),
            ],
            news_api_key: None,
            news_page_size: 6,
            jobs_limit: 5,
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".to_string(),
            fuel_endpoint: None,
            food_endpoint: None,
            refresh_interval_ms: 300_000,
            alert_threshold_pct: 3.0,
            http_timeout_secs: 10,
            summary_file: PathBuf::from("latest_news.json"),
            bind_addr: "0.0.0.0:8000".to_string(),
            equity_base: "https://query1.finance.yahoo.com".to_string(),
            crypto_base: "https://api.coingecko.com".to_string(),
            news_base: "https://newsapi.org".to_string(),
            jobs_base: "https://remotive.com".to_string(),
            gemini_base: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

/// Optional file layer. Every field is optional so a partial file only
/// touches what it names.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    tickers: Option<Vec<String>>,
    indices: Option<Vec<IndexSpec>>,
    crypto_ids: Option<Vec<String>>,
    news_page_size: Option<u32>,
    jobs_limit: Option<u32>,
    gemini_model: Option<String>,
    refresh_interval_ms: Option<u64>,
    alert_threshold_pct: Option<f64>,
    http_timeout_secs: Option<u64>,
    summary_file: Option<PathBuf>,
    bind_addr: Option<String>,
    fuel: Option<EndpointConfig>,
    food: Option<EndpointConfig>,
}

#[derive(Debug, Deserialize)]
struct EndpointConfig {
    url: String,
    api_key: Option<String>,
}

impl AppConfig {
    /// Resolve the effective configuration:
    /// 1) `$DASHBOARD_CONFIG_PATH` (error if it points nowhere)
    /// 2) `config/dashboard.toml` when present
    /// 3) built-in defaults
    /// then apply environment overrides on top.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(path) = config_file_path()? {
            let file = read_file_config(&path)?;
            cfg.merge_file(file);
            tracing::info!(path = %path.display(), "loaded config file");
        }
        cfg.apply_env();
        Ok(cfg)
    }

    fn merge_file(&mut self, file: FileConfig) {
        if let Some(v) = file.tickers {
            self.tickers = v;
        }
        if let Some(v) = file.indices {
            self.indices = v;
        }
        if let Some(v) = file.crypto_ids {
            self.crypto_ids = v;
        }
        if let Some(v) = file.news_page_size {
            self.news_page_size = v;
        }
        if let Some(v) = file.jobs_limit {
            self.jobs_limit = v;
        }
        if let Some(v) = file.gemini_model {
            self.gemini_model = v;
        }
        if let Some(v) = file.refresh_interval_ms {
            self.refresh_interval_ms = v;
        }
        if let Some(v) = file.alert_threshold_pct {
            self.alert_threshold_pct = v;
        }
        if let Some(v) = file.http_timeout_secs {
            self.http_timeout_secs = v;
        }
        if let Some(v) = file.summary_file {
            self.summary_file = v;
        }
        if let Some(v) = file.bind_addr {
            self.bind_addr = v;
        }
        if let Some(ep) = file.fuel {
            self.fuel_endpoint = Some(CommodityEndpoint {
                url: ep.url,
                api_key: ep.api_key,
            });
        }
        if let Some(ep) = file.food {
            self.food_endpoint = Some(CommodityEndpoint {
                url: ep.url,
                api_key: ep.api_key,
            });
        }
    }

    fn apply_env(&mut self) {
        if let Some(raw) = env_nonempty("STOCK_TICKERS") {
            self.tickers = parse_list(&raw);
        }
        if let Some(raw) = env_nonempty("CRYPTO_IDS") {
            self.crypto_ids = parse_list(&raw);
        }
        if let Some(v) = env_nonempty("NEWS_API_KEY") {
            self.news_api_key = Some(v);
        }
        if let Some(v) = env_parse("NEWS_PAGE_SIZE") {
            self.news_page_size = v;
        }
        if let Some(v) = env_parse("JOBS_LIMIT") {
            self.jobs_limit = v;
        }
        if let Some(v) = env_nonempty("GEMINI_API_KEY") {
            self.gemini_api_key = Some(v);
        }
        if let Some(v) = env_nonempty("GEMINI_MODEL") {
            self.gemini_model = v;
        }
        apply_endpoint_env(&mut self.fuel_endpoint, "FUEL_API_URL", "FUEL_API_KEY");
        apply_endpoint_env(&mut self.food_endpoint, "FOOD_API_URL", "FOOD_API_KEY");
        if let Some(v) = env_parse("REFRESH_INTERVAL_MS") {
            self.refresh_interval_ms = v;
        }
        if let Some(v) = env_parse("ALERT_THRESHOLD_PCT") {
            self.alert_threshold_pct = v;
        }
        if let Some(v) = env_parse("HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = v;
        }
        if let Some(v) = env_nonempty("SUMMARY_FILE") {
            self.summary_file = PathBuf::from(v);
        }
        if let Some(v) = env_nonempty("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = env_nonempty("EQUITY_API_BASE") {
            self.equity_base = v;
        }
        if let Some(v) = env_nonempty("CRYPTO_API_BASE") {
            self.crypto_base = v;
        }
        if let Some(v) = env_nonempty("NEWS_API_BASE") {
            self.news_base = v;
        }
        if let Some(v) = env_nonempty("JOBS_API_BASE") {
            self.jobs_base = v;
        }
        if let Some(v) = env_nonempty("GEMINI_API_BASE") {
            self.gemini_base = v;
        }
    }
}

fn config_file_path() -> Result<Option<PathBuf>> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(Some(pb));
        }
        return Err(anyhow!("DASHBOARD_CONFIG_PATH points to non-existent path"));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default.exists() {
        return Ok(Some(default));
    }
    Ok(None)
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    toml::from_str(&content).context("parsing config file")
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_nonempty(key)?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable env override");
            None
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn apply_endpoint_env(slot: &mut Option<CommodityEndpoint>, url_key: &str, api_key_key: &str) {
    let url = env_nonempty(url_key);
    let api_key = env_nonempty(api_key_key);
    match (url, api_key) {
        (Some(url), api_key) => *slot = Some(CommodityEndpoint { url, api_key }),
        (None, Some(api_key)) => {
            if let Some(ep) = slot {
                ep.api_key = Some(api_key);
            }
        }
        (None, None) => {}
    }
}
