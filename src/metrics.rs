use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the process-wide Prometheus recorder. Descriptions and the
    /// static cadence gauge only register once a recorder exists, so they
    /// happen here rather than at the emission sites.
    pub fn init(refresh_interval_ms: u64) -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        ensure_metrics_described();
        gauge!("snapshot_refresh_interval_ms").set(refresh_interval_ms as f64);

        Self { handle }
    }

    /// Router serving the Prometheus exposition at `/metrics`.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    }
}

/// One-time series registration. Also called from `Assembler::new` so test
/// harnesses that skip `Metrics::init` still go through the same path.
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "source_fetch_errors_total",
            "Adapter calls that ended Unavailable."
        );
        describe_histogram!("source_fetch_ms", "Provider fetch+decode time in milliseconds.");
        describe_counter!("snapshot_builds_total", "Completed snapshot assemblies.");
        describe_counter!("snapshot_alerts_total", "Alert events emitted across snapshots.");
        describe_gauge!(
            "snapshot_last_refresh_ts",
            "Unix ts when the last snapshot was published."
        );
        describe_gauge!(
            "snapshot_refresh_interval_ms",
            "Configured refresh cadence in milliseconds."
        );
        describe_counter!("enrich_calls_total", "Enrichment provider calls issued.");
        describe_counter!(
            "enrich_errors_total",
            "Enrichment calls that degraded to an error marker."
        );
        describe_counter!(
            "cache_write_errors_total",
            "Best-effort cache writes that failed."
        );
    });
}
