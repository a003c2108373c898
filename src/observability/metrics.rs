//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Install the Prometheus recorder once per process
//! - Record per-request counters and latency
//! - Render the exposition text for `/prometheus`
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, route, status
//! - `http_request_duration_seconds` (histogram): latency distribution
//! - `http_active_connections` (gauge): current connection count
//!
//! # Design Decisions
//! - Route label is the matched template (`/users/{id}`), never the raw path
//! - Histogram buckets tuned for typical web latencies

use std::sync::OnceLock;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder (first call) and return its handle.
pub fn install_recorder() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let builder = match PrometheusBuilder::new().set_buckets_for_metric(
                Matcher::Full("http_request_duration_seconds".to_string()),
                LATENCY_BUCKETS,
            ) {
                Ok(builder) => builder,
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid latency buckets, using summaries");
                    PrometheusBuilder::new()
                }
            };

            let recorder = builder.build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                tracing::warn!("Metrics recorder already installed; /prometheus will be empty");
            }
            handle
        })
        .clone()
}

/// Record one completed request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("path", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Middleware recording request metrics.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = request.method().to_string();

    let response = next.run(request).await;
    record_request(&method, &route, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_renders_requests() {
        let handle = install_recorder();

        record_request("GET", "/metrics-test", 200, Instant::now());
        let text = handle.render();
        assert!(text.contains("http_requests_total"), "{}", text);
        assert!(text.contains("path=\"/metrics-test\""), "{}", text);

        // Later calls share the recorder.
        assert!(install_recorder().render().contains("/metrics-test"));
    }
}
