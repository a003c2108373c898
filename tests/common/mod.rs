//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{extract::Path, routing::get, Router};
use base_api::{ApiError, ApiServer, ServerError, Shutdown, ShutdownOutcome};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A server running on an ephemeral localhost port.
#[allow(dead_code)]
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<ShutdownOutcome, ServerError>>,
}

#[allow(dead_code)]
impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Bind 127.0.0.1:0 and serve `server` in the background.
pub async fn start(server: ApiServer) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = server.shutdown_handle();
    let handle = tokio::spawn(server.serve(listener));

    // Wait for the accept loop.
    tokio::time::sleep(Duration::from_millis(50)).await;

    RunningServer {
        addr,
        shutdown,
        handle,
    }
}

/// Client without connection pooling or system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Routes used to exercise recovery and shutdown behaviour.
#[allow(dead_code)]
pub fn test_routes() -> Router {
    Router::new()
        .route("/panic", get(panicking))
        .route("/sleep/{millis}", get(sleeping))
        .route("/fail", get(failing))
}

async fn panicking() -> &'static str {
    panic!("handler exploded")
}

async fn sleeping(Path(millis): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    "done"
}

async fn failing() -> Result<&'static str, ApiError> {
    Err(ApiError::internal("backing store unavailable"))
}
