use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init_metrics() {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        panic!("failed to set metrics handle: already initialized");
    }
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record an admitted payment by its stored status.
pub fn record_payment(status: &str) {
    metrics::counter!("rent_payments_total", "status" => status.to_string()).increment(1);
}

/// Record placeholders created by a backfill pass.
pub fn record_backfill(count: u64) {
    if count > 0 {
        metrics::counter!("rent_due_backfilled_total").increment(count);
    }
}

/// Record a duplicate-month rejection.
pub fn record_conflict() {
    metrics::counter!("rent_payment_conflicts_total").increment(1);
}
