//! Refresh driver: the loop that turns the assembler over on a fixed cadence.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::assemble::Assembler;
use crate::cache::NewsCache;
use crate::store::SnapshotStore;

#[derive(Clone, Copy, Debug)]
pub struct RefreshCfg {
    pub interval_ms: u64,
}

/// Spawn the refresh loop: assemble, persist news summaries, publish,
/// sleep, repeat. The first cycle starts immediately. A cycle that overruns
/// the interval delays the next tick instead of stacking ticks, so two
/// cycles never run at once.
pub fn spawn_refresh_driver(
    assembler: Arc<Assembler>,
    store: SnapshotStore,
    cache: Arc<NewsCache>,
    cfg: RefreshCfg,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // interval(0) panics
        let mut ticker = tokio::time::interval(Duration::from_millis(cfg.interval_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;

            let snapshot = assembler.assemble().await;
            cache.save(&snapshot.news);

            let alerts = snapshot.alerts.len();
            let generated_at = snapshot.generated_at;
            let published = store.publish(snapshot);

            counter!("snapshot_builds_total").increment(1);
            counter!("snapshot_alerts_total").increment(alerts as u64);
            gauge!("snapshot_last_refresh_ts").set(generated_at.timestamp() as f64);

            tracing::info!(
                alerts,
                published,
                generated_at = %generated_at,
                "refresh cycle complete"
            );
        }
    })
}
