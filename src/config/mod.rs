//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize into ServiceConfig)
//!     → ServerConfig (partial, zero values mean "unset")
//!     → resolve.rs (fill defaults, union CORS sets, derive api_host)
//!     → ResolvedConfig (immutable)
//!     → shared via Arc with handlers and the listener
//! ```
//!
//! # Design Decisions
//! - Resolution is an explicit field-by-field function, no reflection
//! - Resolution never fails; unusable input is logged and skipped
//! - Config is immutable once resolved

pub mod loader;
pub mod resolve;
pub mod schema;

pub use loader::{load_config, ConfigError, ServiceConfig};
pub use resolve::{derive_api_host, resolve, resolve_with};
pub use schema::{Defaults, ResolvedConfig, ServerConfig};
