//! Cross-cutting request middleware.
//!
//! # Order (outermost first)
//! ```text
//! logging.rs (timing log)
//!     → recovery.rs (panic → 500)
//!     → request ID + tracing span
//!     → request metrics (when enabled)
//!     → cors.rs
//!     → write timeout
//!     → route dispatch
//! ```

pub mod cors;
pub mod logging;
pub mod recovery;

pub use cors::cors_layer;
pub use logging::log_request;
pub use recovery::panic_response;
