use axum::extract::State;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Register descriptions for every metric the relay emits.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "relay_submissions_total",
        "Submissions received by the relay"
    );
    metrics::describe_counter!(
        "relay_forward_failures_total",
        "Submissions that could not be handed to the workflow"
    );
    metrics::describe_counter!(
        "workflow_non_success_total",
        "Workflow webhook replies with a non-success status"
    );
    metrics::describe_counter!(
        "status_checks_total",
        "Status checks by outcome (not_found, pending, completed, error)"
    );
    metrics::describe_histogram!(
        "sheet_fetch_seconds",
        "Time to fetch the full status sheet"
    );
}

/// GET /metrics — Prometheus text exposition format.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}
