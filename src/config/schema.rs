//! Configuration schema definitions.
//!
//! `ServerConfig` is what callers write (every field may be left at its zero
//! value). `ResolvedConfig` is what the server runs with after
//! [`resolve`](crate::config::resolve) has filled in the gaps.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Caller-supplied, possibly partial, server configuration.
///
/// Zero values (`0`, `false`, `""`, `[]`) mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub listen_port: u16,

    /// Deadline for producing a response, in seconds.
    pub write_timeout: u64,

    /// Deadline for reading request headers, in seconds.
    pub read_timeout: u64,

    /// Close connections with no socket activity after this many seconds.
    pub idle_timeout: u64,

    /// How long shutdown waits for in-flight requests, in seconds.
    pub graceful_timeout: u64,

    /// Mount the swagger UI under `/swagger`.
    pub swagger: bool,

    /// Swagger is reached directly (`host:port`) rather than through a gateway.
    pub local_swagger: bool,

    /// Expose `/prometheus` and record request metrics.
    pub prometheus: bool,

    /// URL scheme used in generated links ("http" or "https").
    pub schema: String,

    /// Application name, used in gateway URLs and span fields.
    pub app: String,

    /// Externally reachable host name.
    pub host: String,

    /// Extra CORS origins.
    pub allowed_origins: Vec<String>,

    /// Extra CORS request headers.
    #[serde(alias = "allowed_header")]
    pub allowed_headers: Vec<String>,

    /// Extra CORS methods.
    pub allowed_methods: Vec<String>,
}

/// Built-in values substituted for unset fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub listen_port: u16,
    pub write_timeout: u64,
    pub read_timeout: u64,
    pub idle_timeout: u64,
    pub graceful_timeout: u64,
    pub swagger: bool,
    pub local_swagger: bool,
    pub prometheus: bool,
    pub schema: String,
    pub app: String,
    pub host: String,
    pub allowed_origins: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allowed_methods: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            listen_port: 8080,
            write_timeout: 30,
            read_timeout: 30,
            idle_timeout: 60,
            graceful_timeout: 15,
            swagger: false,
            local_swagger: false,
            prometheus: false,
            schema: "http".to_string(),
            app: String::new(),
            host: String::new(),
            allowed_origins: strings(&["*"]),
            allowed_headers: strings(&[
                "X-Requested-With",
                "Content-Type",
                "Authorization",
                "SERVICE-AGENT",
                "Access-Control-Allow-Methods",
                "Date",
                "X-FORWARDED-FOR",
                "Accept",
                "Content-Length",
                "Accept-Encoding",
                "Service-Agent",
            ]),
            allowed_methods: strings(&["GET", "POST", "PUT", "PATCH", "HEAD", "OPTIONS"]),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Fully populated configuration the server runs with.
///
/// Immutable after resolution; shared with handlers via `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub listen_port: u16,
    pub write_timeout: Duration,
    pub read_timeout: Duration,
    pub idle_timeout: Duration,
    pub graceful_timeout: Duration,
    pub swagger: bool,
    pub local_swagger: bool,
    pub prometheus: bool,
    pub schema: String,
    pub app: String,
    pub host: String,

    /// `host:port` when swagger is served locally, otherwise `host`.
    pub api_host: String,

    pub allowed_origins: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allowed_methods: Vec<String>,

    /// Opaque application payload exposed by `/env`.
    #[serde(skip)]
    pub app_config: serde_json::Value,
}

impl ResolvedConfig {
    /// Attach the application payload shown by `/env`.
    ///
    /// Conversion is best effort: a payload that cannot be represented as
    /// JSON is logged and replaced by `null`.
    pub fn with_app_config<T: Serialize + ?Sized>(mut self, payload: &T) -> Self {
        self.app_config = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "Cannot merge application config");
                serde_json::Value::Null
            }
        };
        self
    }
}
