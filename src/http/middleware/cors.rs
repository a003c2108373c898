//! CORS policy built from the resolved configuration.
//!
//! # Design Decisions
//! - `*` in the origin list allows every origin, but the request origin is
//!   echoed back instead of `*` so that credentials can be allowed
//! - `{schema}://{api_host}` is always an allowed origin when a host is set
//! - Entries that are not valid HTTP tokens are logged and skipped

use axum::http::{request::Parts, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::ResolvedConfig;

/// Origins accepted by the CORS layer.
pub fn allowed_origins(config: &ResolvedConfig) -> Vec<String> {
    let mut origins = config.allowed_origins.clone();
    if !config.api_host.is_empty() {
        let own = format!("{}://{}", config.schema, config.api_host);
        if !origins.contains(&own) {
            origins.push(own);
        }
    }
    origins
}

/// Build the CORS layer. Credentials are always allowed.
pub fn cors_layer(config: &ResolvedConfig) -> CorsLayer {
    let origins = allowed_origins(config);
    let any_origin = origins.iter().any(|o| o == "*");
    let exact: Vec<HeaderValue> = origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let mut methods: Vec<Method> = Vec::new();
    for m in &config.allowed_methods {
        match Method::from_bytes(m.trim().as_bytes()) {
            Ok(method) if !methods.contains(&method) => methods.push(method),
            Ok(_) => {}
            Err(e) => tracing::warn!(method = %m, error = %e, "Ignoring invalid CORS method"),
        }
    }

    let mut headers: Vec<HeaderName> = Vec::new();
    for h in &config.allowed_headers {
        match HeaderName::from_bytes(h.trim().as_bytes()) {
            Ok(name) if !headers.contains(&name) => headers.push(name),
            Ok(_) => {}
            Err(e) => tracing::warn!(header = %h, error = %e, "Ignoring invalid CORS header"),
        }
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| any_origin || exact.contains(origin),
        ))
        .allow_methods(AllowMethods::list(methods))
        .allow_headers(AllowHeaders::list(headers))
        .allow_credentials(true)
}
