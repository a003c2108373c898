//! Panic recovery.
//!
//! A panic while dispatching a request is turned into a generic 500 by
//! `tower_http::catch_panic`; this module supplies the response and logs the
//! panic payload. The connection and the process keep serving.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Response used for any panicking request.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "non-string panic payload"
    };

    tracing::error!(panic = %detail, "Recovered from panic in request handler");

    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_kinds_map_to_500() {
        let payloads: Vec<Box<dyn Any + Send>> = vec![
            Box::new("static str"),
            Box::new(String::from("owned")),
            Box::new(42u32),
        ];
        for payload in payloads {
            assert_eq!(panic_response(payload).status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
