//! Per-connection read and idle timeout tests.

use std::time::Duration;

use base_api::{ApiServer, ServerConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;

/// Read until the server closes the connection, or fail after `limit`.
async fn read_until_closed(stream: &mut TcpStream, limit: Duration) -> Vec<u8> {
    let mut received = Vec::new();
    let closed = tokio::time::timeout(limit, async {
        let mut buf = [0u8; 1024];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => received.extend_from_slice(&buf[..n]),
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "connection still open after {:?}", limit);
    received
}

#[tokio::test]
async fn test_slow_handler_outlives_idle_timeout() {
    let config = ServerConfig {
        idle_timeout: 1,
        write_timeout: 30,
        ..Default::default()
    };
    let server = common::start(
        ApiServer::initialize(config, &()).mount("/test", common::test_routes()),
    )
    .await;

    let res = common::client()
        .get(server.url("/test/sleep/2500"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "done");

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_idle_connection_is_closed() {
    let config = ServerConfig {
        idle_timeout: 1,
        ..Default::default()
    };
    let server = common::start(ApiServer::initialize(config, &())).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    // The keep-alive connection is dropped once it sits idle.
    let received = read_until_closed(&mut stream, Duration::from_secs(3)).await;
    let text = String::from_utf8_lossy(&received);
    assert!(text.starts_with("HTTP/1.1 200"), "{}", text);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_incomplete_request_head_is_cut() {
    let config = ServerConfig {
        read_timeout: 1,
        ..Default::default()
    };
    let server = common::start(ApiServer::initialize(config, &())).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\n")
        .await
        .unwrap();

    let received = read_until_closed(&mut stream, Duration::from_secs(3)).await;
    assert!(!String::from_utf8_lossy(&received).contains("200 OK"));

    server.shutdown.trigger();
}
