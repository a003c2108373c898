//! Request timing log.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// Log method, URI, status and elapsed time of every request.
pub async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::debug!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        elapsed = ?start.elapsed(),
        "Request served"
    );
    response
}
