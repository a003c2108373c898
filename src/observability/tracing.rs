//! Request tracing support.
//!
//! # Responsibilities
//! - Generate a request ID for every request (UUID v4)
//! - Create one span per request carrying app, method, URI and request ID
//! - Record an incoming W3C `traceparent` so logs can be joined upstream
//!
//! # Design Decisions
//! - Request ID is assigned before the span is created
//! - Span level is INFO so it survives the default filter

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use tower_http::trace::MakeSpan;
use tracing::Span;
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const TRACEPARENT: &str = "traceparent";

/// Request ID generator backed by UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}

/// Builds the per-request `http_request` span.
#[derive(Debug, Clone)]
pub struct RequestSpan {
    app: Arc<str>,
}

impl RequestSpan {
    pub fn new(app: &str) -> Self {
        Self { app: Arc::from(app) }
    }
}

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string()
        };
        let request_id = header(X_REQUEST_ID.as_str());
        let traceparent = header(TRACEPARENT);

        tracing::info_span!(
            "http_request",
            app = %self.app,
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
            traceparent = %traceparent,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique_uuids() {
        let request = Request::new(());
        let mut maker = UuidRequestId;
        let a = maker.make_request_id(&request).unwrap();
        let b = maker.make_request_id(&request).unwrap();

        let a = a.header_value().to_str().unwrap().to_string();
        let b = b.header_value().to_str().unwrap().to_string();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
