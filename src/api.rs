use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use tower_http::cors::CorsLayer;

use crate::cache::NewsCache;
use crate::model::{AlertEvent, NewsSummary, Snapshot};
use crate::store::SnapshotStore;

#[derive(Clone)]
pub struct AppState {
    pub store: SnapshotStore,
    pub cache: Arc<NewsCache>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/snapshot", get(snapshot))
        .route("/snapshot/news", get(snapshot_news))
        .route("/alerts", get(alerts))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Latest complete snapshot; JSON `null` until the first refresh lands.
async fn snapshot(State(state): State<AppState>) -> Json<Option<Snapshot>> {
    Json(state.store.latest().map(|s| (*s).clone()))
}

/// News summaries from the live snapshot, else the cache file left by a
/// previous run. Covers both cold start and a news-provider outage.
async fn snapshot_news(State(state): State<AppState>) -> Json<Vec<NewsSummary>> {
    if let Some(snapshot) = state.store.latest() {
        if !snapshot.news.is_empty() {
            return Json(snapshot.news.clone());
        }
    }
    Json(state.cache.load().unwrap_or_default())
}

async fn alerts(State(state): State<AppState>) -> Json<Vec<AlertEvent>> {
    let out = state
        .store
        .latest()
        .map(|s| s.alerts.clone())
        .unwrap_or_default();
    Json(out)
}
