//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted connection (net::listener)
//!     → middleware/ (timing log, panic recovery, request ID + span,
//!       metrics, CORS, write timeout)
//!     → route dispatch (diagnostics, swagger, mounted routers)
//!     → response.rs (JSON envelope / ApiError)
//!     → Send to client
//! ```

pub mod middleware;
pub mod response;
pub mod server;

pub use response::{ApiError, JsonResult};
pub use server::{ApiServer, ServerError};
