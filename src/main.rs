//! Binary entrypoint: boots the refresh driver and the Axum HTTP server.

use std::future::IntoFuture;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use market_pulse::api::{create_router, AppState};
use market_pulse::assemble::Assembler;
use market_pulse::cache::NewsCache;
use market_pulse::config::AppConfig;
use market_pulse::metrics::Metrics;
use market_pulse::refresh::{spawn_refresh_driver, RefreshCfg};
use market_pulse::store::SnapshotStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("market_pulse=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load()?;
    let metrics = Metrics::init(cfg.refresh_interval_ms);

    let store = SnapshotStore::new();
    let cache = Arc::new(NewsCache::new(cfg.summary_file.clone()));
    let assembler = Arc::new(Assembler::from_config(&cfg));

    let driver = spawn_refresh_driver(
        assembler,
        store.clone(),
        cache.clone(),
        RefreshCfg {
            interval_ms: cfg.refresh_interval_ms,
        },
    );

    let state = AppState { store, cache };
    let app = create_router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "listening");

    // The driver is load-bearing: if it dies, the process should too rather
    // than serve an ever-staler snapshot.
    tokio::select! {
        served = axum::serve(listener, app).into_future() => {
            served.context("http server terminated")?;
        }
        driver_end = driver => {
            driver_end.map_err(|e| anyhow!("refresh driver panicked: {e}"))?;
            return Err(anyhow!("refresh driver exited unexpectedly"));
        }
    }
    Ok(())
}
