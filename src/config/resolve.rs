//! Default resolution for the server configuration.
//!
//! # Rules
//! - Scalars: a zero value in the partial takes the default, anything else
//!   is kept verbatim.
//! - Origins, headers, methods: defaults first, then every caller entry not
//!   already present. Nothing the caller supplied is dropped.
//! - `api_host` is derived last, from the already resolved host and port.

use std::time::Duration;

use crate::config::schema::{Defaults, ResolvedConfig, ServerConfig};

/// Resolve a partial configuration against the built-in defaults.
pub fn resolve(partial: ServerConfig) -> ResolvedConfig {
    resolve_with(partial, &Defaults::default())
}

/// Resolve a partial configuration against explicit defaults.
pub fn resolve_with(partial: ServerConfig, defaults: &Defaults) -> ResolvedConfig {
    let listen_port = or_default(partial.listen_port, defaults.listen_port);
    let local_swagger = partial.local_swagger || defaults.local_swagger;
    let host = or_default_string(partial.host, &defaults.host);
    let api_host = derive_api_host(&host, listen_port, local_swagger);

    ResolvedConfig {
        listen_port,
        write_timeout: seconds(or_default(partial.write_timeout, defaults.write_timeout)),
        read_timeout: seconds(or_default(partial.read_timeout, defaults.read_timeout)),
        idle_timeout: seconds(or_default(partial.idle_timeout, defaults.idle_timeout)),
        graceful_timeout: seconds(or_default(partial.graceful_timeout, defaults.graceful_timeout)),
        swagger: partial.swagger || defaults.swagger,
        local_swagger,
        prometheus: partial.prometheus || defaults.prometheus,
        schema: or_default_string(partial.schema, &defaults.schema),
        app: or_default_string(partial.app, &defaults.app),
        host,
        api_host,
        allowed_origins: union(
            "allowed_origins",
            &defaults.allowed_origins,
            partial.allowed_origins,
        ),
        allowed_headers: union(
            "allowed_headers",
            &defaults.allowed_headers,
            partial.allowed_headers,
        ),
        allowed_methods: union(
            "allowed_methods",
            &defaults.allowed_methods,
            partial.allowed_methods,
        ),
        app_config: serde_json::Value::Null,
    }
}

/// `host:port` for locally served swagger, the bare host otherwise.
pub fn derive_api_host(host: &str, port: u16, local_swagger: bool) -> String {
    if local_swagger {
        format!("{}:{}", host, port)
    } else {
        host.to_string()
    }
}

fn or_default<T: Default + PartialEq>(value: T, default: T) -> T {
    if value == T::default() {
        default
    } else {
        value
    }
}

fn or_default_string(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

fn seconds(secs: u64) -> Duration {
    Duration::from_secs(secs)
}

/// Insertion-ordered union; blank caller entries are skipped.
fn union(field: &'static str, defaults: &[String], extra: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(defaults.len() + extra.len());
    for value in defaults.iter().cloned().chain(extra) {
        if value.trim().is_empty() {
            tracing::warn!(field, "Skipping blank configuration entry");
            continue;
        }
        if !merged.contains(&value) {
            merged.push(value);
        }
    }
    merged
}
