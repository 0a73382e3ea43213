//! Prometheus metrics

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Call once at startup; repeated calls are
/// no-ops.
pub fn init_metrics() {
    if PROMETHEUS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = PROMETHEUS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!("failed to install metrics recorder: {}", e),
    }
}

/// Render the Prometheus exposition text
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

/// Count one request to a route
pub fn record_request(route: &'static str) {
    metrics::counter!("avatar_agent_requests_total", "route" => route).increment(1);
}

/// Count a terminal pipeline failure (double failure)
pub fn record_pipeline_failure() {
    metrics::counter!("avatar_agent_pipeline_failures_total").increment(1);
}

/// Record end-to-end chat latency
pub fn record_chat_latency(seconds: f64) {
    metrics::histogram!("avatar_agent_chat_duration_seconds").record(seconds);
}
