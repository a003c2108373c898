//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::schema::ServerConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level service configuration file.
///
/// Known keys are typed; everything else is kept in `extra` so that `/env`
/// can show the whole application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service name, copied into `api.app` when that is unset.
    pub app_name: String,

    /// Deployment profile (dev, stage, prod).
    pub profile_name: String,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// HTTP server settings.
    pub api: ServerConfig,

    /// Remaining application keys.
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl ServiceConfig {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: ServiceConfig = toml::from_str(content)?;
        if config.api.app.is_empty() {
            config.api.app = config.app_name.clone();
        }
        for value in config.extra.iter_mut().map(|(_, v)| v) {
            datetimes_to_strings(value);
        }
        Ok(config)
    }
}

/// Replace TOML datetimes with their RFC 3339 text.
///
/// A datetime otherwise serializes as an internal marker table, which is
/// what `/env` would show.
fn datetimes_to_strings(value: &mut toml::Value) {
    match value {
        toml::Value::Datetime(dt) => {
            let text = dt.to_string();
            *value = toml::Value::String(text);
        }
        toml::Value::Array(items) => items.iter_mut().for_each(datetimes_to_strings),
        toml::Value::Table(table) => table.iter_mut().for_each(|(_, v)| datetimes_to_strings(v)),
        _ => {}
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    ServiceConfig::from_toml(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_config() {
        let config = ServiceConfig::from_toml(
            r#"
            app_name = "billing"
            log_level = "debug"

            [api]
            listen_port = 9100
            swagger = true
            allowed_header = ["X-Tenant"]

            [database]
            url = "postgres://localhost/billing"
            "#,
        )
        .unwrap();

        assert_eq!(config.app_name, "billing");
        assert_eq!(config.api.app, "billing");
        assert_eq!(config.api.listen_port, 9100);
        assert!(config.api.swagger);
        assert_eq!(config.api.allowed_headers, vec!["X-Tenant"]);
        assert!(config.extra.contains_key("database"));
    }

    #[test]
    fn test_datetimes_become_strings() {
        let config = ServiceConfig::from_toml(
            r#"
            released = 1979-05-27T07:32:00Z

            [schedule]
            windows = [1979-05-28, 07:32:00]
            "#,
        )
        .unwrap();

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["released"], "1979-05-27T07:32:00Z");
        assert_eq!(json["schedule"]["windows"][0], "1979-05-28");
        assert_eq!(json["schedule"]["windows"][1], "07:32:00");
    }

    #[test]
    fn test_explicit_api_app_wins() {
        let config = ServiceConfig::from_toml(
            r#"
            app_name = "billing"
            [api]
            app = "billing-gw"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.app, "billing-gw");
    }

    #[test]
    fn test_parse_error() {
        let err = ServiceConfig::from_toml("[api]\nlisten_port = \"eighty\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/base-api.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
