//! TCP accept loop with bounded graceful shutdown.
//!
//! # Responsibilities
//! - Accept incoming TCP connections and serve them as HTTP/1.1
//! - Apply read (header) and idle (between requests) timeouts per connection
//! - Log accept errors without stopping the loop
//! - On shutdown: stop accepting, drain in-flight requests, abort stragglers
//!
//! # Design Decisions
//! - One task per connection, tracked in a `JoinSet` so it can be aborted
//! - hyper-util `GracefulShutdown` tells live connections to finish their
//!   current request and close instead of waiting for the next one
//! - The listener is dropped as soon as shutdown starts, so new connection
//!   attempts are refused rather than queued

use std::future::Future;
use std::time::Duration;

use axum::Router;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::Request;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tower::ServiceExt;

use crate::net::idle::{IdleTimeout, InFlight};

/// Pause after a failed accept (e.g. EMFILE) before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Per-connection timeouts.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionTimeouts {
    /// Deadline for receiving a complete request head.
    ///
    /// The body is not covered: handlers reading a slow body are bounded by
    /// the write timeout of the middleware stack instead.
    pub read: Duration,
    /// Close a connection that sits between requests, without socket I/O,
    /// for this long. Never applies while a request is being handled.
    pub idle: Duration,
}

/// How the drain phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every connection finished within the grace period.
    Drained,
    /// The grace period elapsed; this many connections were aborted.
    ForcedClose { aborted: usize },
}

/// Serve `app` on `listener` until `shutdown` resolves, then drain.
pub async fn serve_connections<F>(
    listener: TcpListener,
    app: Router,
    timeouts: ConnectionTimeouts,
    grace: Duration,
    shutdown: F,
) -> ShutdownOutcome
where
    F: Future<Output = ()>,
{
    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .header_read_timeout(timeouts.read)
        .keep_alive(true);

    let graceful = GracefulShutdown::new();
    let mut connections = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr)) => {
                    tracing::debug!(peer_addr = %peer_addr, "Connection accepted");

                    let in_flight = InFlight::new();
                    let stream = IdleTimeout::new(stream, timeouts.idle, in_flight.clone());
                    let io = TokioIo::new(stream);
                    // The idle clock is paused until the response is produced.
                    let tracked = ServiceExt::<Request<Incoming>>::map_future(
                        app.clone(),
                        move |response| {
                            let guard = in_flight.begin();
                            async move {
                                let response = response.await;
                                drop(guard);
                                response
                            }
                        },
                    );
                    let service = TowerToHyperService::new(tracked);
                    let conn = graceful.watch(builder.serve_connection(io, service));

                    metrics::gauge!("http_active_connections").increment(1.0);
                    connections.spawn(async move {
                        if let Err(e) = conn.await {
                            tracing::debug!(
                                peer_addr = %peer_addr,
                                error = %e,
                                "Connection closed with error"
                            );
                        }
                        metrics::gauge!("http_active_connections").decrement(1.0);
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            },
            _ = &mut shutdown => break,
        }

        // Reap finished connection tasks.
        while connections.try_join_next().is_some() {}
    }

    drop(listener);
    while connections.try_join_next().is_some() {}

    tracing::info!(
        in_flight = connections.len(),
        grace_secs = grace.as_secs_f64(),
        "Stopped accepting, draining connections"
    );

    let outcome = match tokio::time::timeout(grace, graceful.shutdown()).await {
        Ok(()) => ShutdownOutcome::Drained,
        Err(_) => {
            while connections.try_join_next().is_some() {}
            let aborted = connections.len();
            tracing::warn!(aborted, "Graceful timeout elapsed, closing remaining connections");
            connections.abort_all();
            ShutdownOutcome::ForcedClose { aborted }
        }
    };

    while connections.join_next().await.is_some() {}
    outcome
}
