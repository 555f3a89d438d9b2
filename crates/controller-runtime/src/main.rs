//! # Access Controller
//!
//! Entry point. Initializes telemetry, loads configuration from `AC_*`
//! environment variables and runs until Ctrl+C.

use access_telemetry::{init_telemetry, TelemetryConfig};
use anyhow::{Context, Result};
use controller_runtime::container::ControllerConfig;
use controller_runtime::{Collaborators, ControllerRuntime};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging and metrics
    let telemetry =
        init_telemetry(&TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    // Load configuration
    let config = ControllerConfig::from_env();
    config.validate().context("Invalid configuration")?;

    // Create and start the runtime
    let mut runtime = ControllerRuntime::new(config, Some(telemetry.metrics()))?;
    runtime.start(Collaborators::host())?;

    info!("Controller is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    // Graceful shutdown
    runtime.shutdown().await;

    Ok(())
}
