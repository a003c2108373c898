//! Graceful shutdown tests.

use std::time::Duration;

use base_api::{ApiServer, LifecycleState, ServerConfig, ShutdownOutcome};

mod common;

fn server_with_grace(graceful_timeout: u64) -> ApiServer {
    let config = ServerConfig {
        graceful_timeout,
        ..Default::default()
    };
    ApiServer::initialize(config, &()).mount("/test", common::test_routes())
}

#[tokio::test]
async fn test_in_flight_request_completes() {
    let server = common::start(server_with_grace(2)).await;
    let client = common::client();

    let url = server.url("/test/sleep/300");
    let request = tokio::spawn(async move { client.get(url).send().await });

    // Let the request reach the handler before stopping.
    tokio::time::sleep(Duration::from_millis(100)).await;
    server.shutdown.trigger();

    let res = request.await.unwrap().unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "done");

    let outcome = server.handle.await.unwrap().unwrap();
    assert_eq!(outcome, ShutdownOutcome::Drained);
}

#[tokio::test]
async fn test_idle_server_drains_immediately() {
    let server = common::start(server_with_grace(5)).await;

    server.shutdown.trigger();
    let outcome = tokio::time::timeout(Duration::from_secs(1), server.handle)
        .await
        .expect("idle server did not stop promptly")
        .unwrap()
        .unwrap();
    assert_eq!(outcome, ShutdownOutcome::Drained);
}

#[tokio::test]
async fn test_slow_request_is_cut_at_deadline() {
    let server = common::start(server_with_grace(1)).await;
    let client = common::client();

    let url = server.url("/test/sleep/10000");
    let request = tokio::spawn(async move { client.get(url).send().await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let started = std::time::Instant::now();
    server.shutdown.trigger();

    let outcome = server.handle.await.unwrap().unwrap();
    assert_eq!(outcome, ShutdownOutcome::ForcedClose { aborted: 1 });
    assert!(started.elapsed() < Duration::from_secs(3));

    // The client sees the connection drop rather than a response.
    assert!(request.await.unwrap().is_err());
}

#[tokio::test]
async fn test_new_connections_refused_after_shutdown() {
    let server = common::start(server_with_grace(1)).await;
    let addr = server.addr;

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();

    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_no_new_requests_while_draining() {
    let server = common::start(server_with_grace(5)).await;

    let url = server.url("/test/sleep/1000");
    let slow_client = common::client();
    let slow = tokio::spawn(async move { slow_client.get(url).send().await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    server.shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The slow request is still being drained at this point.
    assert!(!slow.is_finished());
    let late = common::client().get(server.url("/health")).send().await;
    assert!(late.is_err(), "request accepted after shutdown began");

    let res = slow.await.unwrap().unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "done");

    let outcome = server.handle.await.unwrap().unwrap();
    assert_eq!(outcome, ShutdownOutcome::Drained);
}

#[tokio::test]
async fn test_lifecycle_reaches_terminated() {
    let server = server_with_grace(1);
    assert_eq!(server.state(), LifecycleState::Initialized);
    let mut states = server.lifecycle();

    let running = common::start(server).await;
    states.wait_for(|s| *s == LifecycleState::Running).await.unwrap();

    running.shutdown.trigger();
    running.handle.await.unwrap().unwrap();
    assert_eq!(*states.borrow(), LifecycleState::Terminated);
}
