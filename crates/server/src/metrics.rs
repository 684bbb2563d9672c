//! Prometheus metrics
//!
//! The recorder is process-global; `init_metrics` installs it once and later
//! calls return the same handle.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder
///
/// Returns `None` if another recorder was already installed by someone else.
pub fn init_metrics() -> Option<PrometheusHandle> {
    HANDLE
        .get_or_try_init(|| PrometheusBuilder::new().install_recorder())
        .map(Clone::clone)
        .map_err(|e| tracing::warn!(error = %e, "Failed to install Prometheus recorder"))
        .ok()
}

/// Render the current metrics in Prometheus text format
pub fn render() -> Option<String> {
    HANDLE.get().map(PrometheusHandle::render)
}

/// `GET /metrics`
pub async fn metrics_handler() -> impl IntoResponse {
    match render() {
        Some(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            body,
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [("content-type", "text/plain; version=0.0.4")],
            "# metrics disabled\n".to_string(),
        ),
    }
}

/// Middleware recording [`record_request`] for every routed request
///
/// Labels use the route template, so unmatched paths share one `unmatched` series.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let start = Instant::now();

    let response = next.run(request).await;

    record_request(route, response.status().as_u16(), start.elapsed().as_secs_f64());
    response
}

/// Count a finished HTTP request and record its latency
pub fn record_request(route: impl Into<String>, status: u16, seconds: f64) {
    let route = route.into();
    counter!(
        "gramasathi_http_requests_total",
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gramasathi_http_request_duration_seconds", "route" => route).record(seconds);
}

/// Count a webhook outcome (`no_media`, `text`, `transcribed`, `fetch_error`, `transcription_error`)
pub fn record_webhook(outcome: &'static str) {
    counter!("gramasathi_webhook_total", "outcome" => outcome).increment(1);
}
