//! Diagnostic route handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::ResolvedConfig;
use crate::diagnostics::version::VersionInfo;
use crate::http::response::JsonResult;

/// Shared state for diagnostic handlers.
#[derive(Clone)]
pub struct DiagnosticsState {
    pub config: Arc<ResolvedConfig>,
    pub version: Arc<VersionInfo>,
    pub metrics: Option<PrometheusHandle>,
}

/// Liveness payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct HealthCheck {
    pub alive: bool,
}

/// Health check.
#[utoipa::path(
    get,
    path = "/health",
    tag = "internal",
    responses(
        (status = 200, description = "Envelope whose data reports liveness", body = HealthCheck)
    )
)]
pub async fn health() -> JsonResult<HealthCheck> {
    JsonResult::ok(HealthCheck { alive: true })
}

/// Build and version information.
#[utoipa::path(
    get,
    path = "/info",
    tag = "internal",
    responses(
        (status = 200, description = "Envelope with build metadata", body = VersionInfo)
    )
)]
pub async fn info(State(state): State<DiagnosticsState>) -> JsonResult<VersionInfo> {
    let version = state.version.as_ref().clone();
    tracing::debug_span!(
        "show_info",
        version = %version.version,
        build_timestamp = %version.build_timestamp,
        git_branch = %version.git_branch,
        git_hash = %version.git_hash,
    )
    .in_scope(|| tracing::debug!("Serving version info"));
    JsonResult::ok(version)
}

/// Application configuration dump.
#[utoipa::path(
    get,
    path = "/env",
    tag = "internal",
    responses(
        (status = 200, description = "Envelope whose data is the application configuration")
    )
)]
pub async fn env(State(state): State<DiagnosticsState>) -> JsonResult<serde_json::Value> {
    let payload = &state.config.app_config;
    JsonResult {
        code: StatusCode::OK.as_u16(),
        message: String::new(),
        data: (!payload.is_null()).then(|| payload.clone()),
    }
}

/// Prometheus text exposition.
pub async fn prometheus(State(state): State<DiagnosticsState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
