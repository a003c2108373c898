//! Diagnostic routes.
//!
//! # Routes
//! - `GET /health` → `{code:200, data:{alive:true}}`
//! - `GET /info` → build metadata (version.rs)
//! - `GET /env` → the application payload supplied at startup
//! - `GET /prometheus` → metrics exposition (only when enabled)
//! - `GET /swagger/*` → API docs UI (only when enabled, swagger.rs)

pub mod handlers;
pub mod swagger;
pub mod version;

use axum::{routing::get, Router};

pub use handlers::{DiagnosticsState, HealthCheck};
pub use version::VersionInfo;

/// Router with the fixed diagnostic routes.
pub fn routes(state: DiagnosticsState) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/info", get(handlers::info))
        .route("/env", get(handlers::env));

    let router = if state.metrics.is_some() {
        router.route("/prometheus", get(handlers::prometheus))
    } else {
        router
    };

    router.with_state(state)
}
