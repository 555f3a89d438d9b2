//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to log lines
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether to include thread ids in log lines
    pub thread_ids: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "access-controller".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            thread_ids: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AC_SERVICE_NAME`: Service name (default: access-controller)
    /// - `AC_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `AC_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `AC_LOG_THREAD_IDS`: Include thread ids (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("AC_SERVICE_NAME")
                .unwrap_or_else(|_| "access-controller".to_string()),

            log_level: env::var("AC_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("AC_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),

            thread_ids: env::var("AC_LOG_THREAD_IDS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
