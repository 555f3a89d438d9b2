//! # Access Telemetry
//!
//! Observability for the access controller.
//!
//! ## Components
//!
//! - **Logging**: `tracing` with a `tracing-subscriber` fmt layer, plain or
//!   JSON, filtered by `EnvFilter`
//! - **Metrics**: Prometheus counters for access decisions, ACL syncs,
//!   integrity failures and mailbox drops
//!
//! ## Usage
//!
//! ```rust,ignore
//! use access_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! let _guard = init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AC_SERVICE_NAME` | `access-controller` | Service name in logs |
//! | `AC_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `AC_JSON_LOGS` | `false` | Emit JSON log lines |
//! | `AC_LOG_THREAD_IDS` | `false` | Include thread ids |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, ACCESS_DECISIONS, ACL_INTEGRITY_FAILURES,
    ACL_SYNC_OUTCOMES, BYTES_DOWNLOADED, MAILBOX_DROPS, MAILBOX_SENT, NET_CONNECTED,
    STATE_TRANSITIONS, TELEMETRY_FAILURES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(config)?;
    Ok(TelemetryGuard { _metrics: metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl TelemetryGuard {
    /// Proof that the metrics are registered.
    pub fn metrics(&self) -> MetricsHandle {
        self._metrics
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
