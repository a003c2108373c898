//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request produces:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms; when prometheus is enabled)
//!     → tracing.rs (span with request ID)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → /prometheus scrape endpoint
//!     → Upstream tracing via the recorded traceparent
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through span and response header
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
pub mod tracing;
