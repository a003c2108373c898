//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Resolve configuration and hold it immutable for the process lifetime
//! - Build the route table (diagnostics, swagger, mounted routers)
//! - Wire up middleware (timing log, panic recovery, tracing, metrics,
//!   CORS, write timeout)
//! - Serve on a background task and drive the lifecycle state machine
//! - Graceful shutdown on signal, bounded by the graceful timeout

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{resolve, ResolvedConfig, ServerConfig};
use crate::diagnostics::{self, swagger, DiagnosticsState, VersionInfo};
use crate::http::middleware::{cors_layer, log_request, panic_response};
use crate::lifecycle::{signals, Lifecycle, LifecycleError, LifecycleState, Shutdown};
use crate::net::{serve_connections, ConnectionTimeouts, ShutdownOutcome};
use crate::observability::metrics;
use crate::observability::tracing::{RequestSpan, UuidRequestId, X_REQUEST_ID};

/// Error type for server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind the listen address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// Listener I/O failure outside of accept.
    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    /// The serving task panicked or was cancelled.
    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// HTTP server exposing the diagnostic routes plus any mounted routers.
pub struct ApiServer {
    config: Arc<ResolvedConfig>,
    version: VersionInfo,
    mounts: Vec<(String, Router)>,
    lifecycle: Lifecycle,
    shutdown: Shutdown,
}

impl ApiServer {
    /// Resolve `partial` against the built-in defaults and attach the
    /// application payload shown by `/env`.
    pub fn initialize<T: Serialize + ?Sized>(partial: ServerConfig, app_config: &T) -> Self {
        Self::new(resolve(partial).with_app_config(app_config))
    }

    /// Create a server from an already resolved configuration.
    pub fn new(config: ResolvedConfig) -> Self {
        let lifecycle = Lifecycle::new();
        if let Err(e) = lifecycle.advance(LifecycleState::Initialized) {
            tracing::error!(error = %e, "Unexpected lifecycle state");
        }

        tracing::info!(
            listen_port = config.listen_port,
            api_host = %config.api_host,
            swagger = config.swagger,
            local_swagger = config.local_swagger,
            prometheus = config.prometheus,
            "Server initialized"
        );

        Self {
            config: Arc::new(config),
            version: VersionInfo::from_build_env(),
            mounts: Vec::new(),
            lifecycle,
            shutdown: Shutdown::new(),
        }
    }

    /// Replace the version metadata served by `/info`.
    pub fn with_version(mut self, version: VersionInfo) -> Self {
        self.version = version;
        self
    }

    /// Attach `router` under `path` ("/" merges at the root).
    pub fn mount(mut self, path: &str, router: Router) -> Self {
        self.mounts.push((path.to_string(), router));
        self
    }

    /// The resolved configuration.
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Observe lifecycle changes, including after the server is consumed.
    pub fn lifecycle(&self) -> watch::Receiver<LifecycleState> {
        self.lifecycle.subscribe()
    }

    /// Handle that stops a running server.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Build the Axum router with all routes and middleware layers.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let config = &self.config;
        let metrics_handle = config.prometheus.then(metrics::install_recorder);

        let state = DiagnosticsState {
            config: config.clone(),
            version: Arc::new(self.version.clone()),
            metrics: metrics_handle,
        };

        let mut app = diagnostics::routes(state);
        if config.swagger {
            tracing::info!(doc_url = %swagger::doc_url(config), "Swagger UI mounted");
            app = app.merge(swagger::routes(config, &self.version));
        }
        for (path, router) in &self.mounts {
            app = mount_at(app, path, router.clone());
        }

        // Innermost first: timeout, then CORS, then optional metrics.
        let app = app
            .layer(TimeoutLayer::new(config.write_timeout))
            .layer(cors_layer(config));
        let app = if config.prometheus {
            app.layer(middleware::from_fn(metrics::track_metrics))
        } else {
            app
        };

        app.layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_request))
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                .layer(TraceLayer::new_for_http().make_span_with(RequestSpan::new(&config.app)))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
        )
    }

    /// Bind `0.0.0.0:{listen_port}` and serve until SIGINT/SIGTERM.
    pub async fn run(self) -> Result<ShutdownOutcome, ServerError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.listen_port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        let _signals = signals::forward_to(self.shutdown.clone());
        self.serve(listener).await
    }

    /// Serve on a bound listener until the shutdown handle is triggered.
    pub async fn serve(self, listener: TcpListener) -> Result<ShutdownOutcome, ServerError> {
        let addr = listener.local_addr()?;
        let app = self.router();
        let timeouts = ConnectionTimeouts {
            read: self.config.read_timeout,
            idle: self.config.idle_timeout,
        };
        let grace = self.config.graceful_timeout;

        self.lifecycle.advance(LifecycleState::Running)?;
        tracing::info!(address = %addr, "HTTP server starting");

        let stop = self.shutdown.clone();
        let serving = tokio::spawn(async move {
            serve_connections(listener, app, timeouts, grace, async move { stop.triggered().await })
                .await
        });

        // Block until asked to stop.
        self.shutdown.triggered().await;
        self.lifecycle.advance(LifecycleState::ShuttingDown)?;

        let outcome = serving.await;
        self.lifecycle.advance(LifecycleState::Terminated)?;

        match outcome {
            Ok(outcome) => {
                if let ShutdownOutcome::ForcedClose { aborted } = outcome {
                    tracing::warn!(aborted, "Shutdown deadline exceeded");
                }
                tracing::info!("shutting down");
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, "Server task failed during shutdown");
                Err(ServerError::Task(e))
            }
        }
    }
}

fn mount_at(app: Router, path: &str, router: Router) -> Router {
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        app.merge(router)
    } else if path.starts_with('/') {
        app.nest(path, router)
    } else {
        app.nest(&format!("/{}", path), router)
    }
}
