//! Network layer.
//!
//! # Data Flow
//! ```text
//! TcpListener::accept
//!     → idle.rs (idle deadline around the socket)
//!     → listener.rs (hyper HTTP/1.1 connection, graceful watch)
//!     → axum Router (middleware + routes)
//! ```
//!
//! # Design Decisions
//! - Read timeout bounds request-head reads (hyper timer)
//! - Write timeout lives in the middleware stack, not here
//! - Shutdown drains for a bounded time, then aborts connection tasks

pub mod idle;
pub mod listener;

pub use idle::{IdleTimeout, InFlight, InFlightGuard};
pub use listener::{serve_connections, ConnectionTimeouts, ShutdownOutcome};
