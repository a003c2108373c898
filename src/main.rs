//! base-api service binary.
//!
//! # Startup Sequence
//!
//! ```text
//!   CLI args ──▶ config file (TOML) ──▶ logging ──▶ ApiServer::initialize
//!                                                         │
//!                                                         ▼
//!   exit 0 ◀── drain (≤ graceful timeout) ◀── SIGINT ◀── serve
//! ```
//!
//! The whole config file is exposed on `/env`; its `[api]` table is the
//! server configuration.

use std::path::PathBuf;

use clap::Parser;

use base_api::config::{load_config, ServiceConfig};
use base_api::lifecycle::signals::wait_for_interrupt;
use base_api::observability::logging::{init_logging, LogFormat};
use base_api::{ApiServer, ServerError};

#[derive(Parser)]
#[command(name = "base-api")]
#[command(about = "HTTP service scaffold with diagnostic endpoints", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "BASE_API_CONFIG")]
    config: Option<PathBuf>,

    /// Seconds to wait for in-flight requests on shutdown.
    #[arg(long)]
    graceful_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(secs) = cli.graceful_timeout {
        config.api.graceful_timeout = secs;
    }

    init_logging(&config.log_level, LogFormat::from_name(&config.log_format));

    tracing::info!(
        app = %config.app_name,
        profile = %config.profile_name,
        config_path = ?cli.config,
        "base-api v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let server = ApiServer::initialize(config.api.clone(), &config);

    match server.run().await {
        Ok(_) => {}
        Err(e @ ServerError::Bind { .. }) => {
            // The listener is gone but the process stays up until told to stop.
            tracing::error!(error = %e, "HTTP listener failed to start");
            wait_for_interrupt().await;
            tracing::info!("shutting down");
        }
        Err(e) => tracing::error!(error = %e, "Shutdown did not complete cleanly"),
    }

    Ok(())
}
