//! Reusable HTTP service scaffold.
//!
//! Resolves a partial server configuration against built-in defaults,
//! exposes diagnostic routes (`/health`, `/info`, `/env`, `/prometheus`,
//! `/swagger`), wraps everything in logging, panic recovery, tracing and
//! CORS middleware, and serves with a bounded graceful shutdown.

pub mod config;
pub mod diagnostics;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::{resolve, ResolvedConfig, ServerConfig};
pub use diagnostics::VersionInfo;
pub use http::{ApiError, ApiServer, JsonResult, ServerError};
pub use lifecycle::{LifecycleState, Shutdown};
pub use net::ShutdownOutcome;
