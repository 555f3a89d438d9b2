//! Prometheus metrics for the access controller.
//!
//! All metrics follow the naming convention: `ac_<unit>_<metric>_<unit>`
//!
//! Only counters and gauges are used; the controller has no latency
//! objectives worth a histogram.

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CONTROLLER METRICS
    // =========================================================================

    /// Access decisions by outcome
    pub static ref ACCESS_DECISIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("ac_controller_access_decisions_total", "Access decisions by outcome"),
        &["outcome"]  // outcome: granted/denied/unknown
    ).expect("metric creation failed");

    /// Controller state transitions
    pub static ref STATE_TRANSITIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("ac_controller_state_transitions_total", "State transitions by target state"),
        &["state"]
    ).expect("metric creation failed");

    // =========================================================================
    // ACL METRICS
    // =========================================================================

    /// ACL sync attempts by outcome
    pub static ref ACL_SYNC_OUTCOMES: IntCounterVec = IntCounterVec::new(
        Opts::new("ac_acl_sync_total", "ACL sync attempts by outcome"),
        &["outcome"]  // outcome: updated/unchanged/failed
    ).expect("metric creation failed");

    /// Integrity failures that purged the stored ACL
    pub static ref ACL_INTEGRITY_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("ac_acl_integrity_failures_total", "ACL integrity failures by reason"),
        &["reason"]  // reason: missing_digest/mismatch/io
    ).expect("metric creation failed");

    /// Bytes received while downloading ACLs and files
    pub static ref BYTES_DOWNLOADED: CounterVec = CounterVec::new(
        Opts::new("ac_network_download_bytes_total", "Bytes received over HTTPS"),
        &["kind"]  // kind: acl/file
    ).expect("metric creation failed");

    // =========================================================================
    // NETWORK METRICS
    // =========================================================================

    /// Whether the network link is up (1) or down (0)
    pub static ref NET_CONNECTED: IntGauge = IntGauge::new(
        "ac_network_connected",
        "Network link state"
    ).expect("metric creation failed");

    /// Telemetry messages that could not be published
    pub static ref TELEMETRY_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("ac_network_telemetry_failures_total", "Telemetry publish failures by topic"),
        &["topic"]
    ).expect("metric creation failed");

    // =========================================================================
    // MAILBOX METRICS
    // =========================================================================

    /// Messages delivered into a mailbox
    pub static ref MAILBOX_SENT: IntCounterVec = IntCounterVec::new(
        Opts::new("ac_mailbox_messages_sent_total", "Messages delivered by mailbox"),
        &["mailbox"]
    ).expect("metric creation failed");

    /// Messages dropped because a mailbox was full or closed
    pub static ref MAILBOX_DROPS: IntCounterVec = IntCounterVec::new(
        Opts::new("ac_mailbox_messages_dropped_total", "Messages dropped by mailbox"),
        &["mailbox"]
    ).expect("metric creation failed");
}

/// Handle proving the metrics were registered.
#[derive(Debug, Clone, Copy)]
pub struct MetricsHandle {
    _registered: (),
}

/// Register all metrics with the global registry.
///
/// Calling this again is harmless; metrics already registered are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Controller
        Box::new(ACCESS_DECISIONS.clone()),
        Box::new(STATE_TRANSITIONS.clone()),
        // ACL
        Box::new(ACL_SYNC_OUTCOMES.clone()),
        Box::new(ACL_INTEGRITY_FAILURES.clone()),
        Box::new(BYTES_DOWNLOADED.clone()),
        // Network
        Box::new(NET_CONNECTED.clone()),
        Box::new(TELEMETRY_FAILURES.clone()),
        // Mailboxes
        Box::new(MAILBOX_SENT.clone()),
        Box::new(MAILBOX_DROPS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { _registered: () })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_is_idempotent() {
        register_metrics().unwrap();
        register_metrics().unwrap();
    }

    #[test]
    fn test_registry_gathers_registered_families() {
        register_metrics().unwrap();
        ACL_SYNC_OUTCOMES.with_label_values(&["gather-test"]).inc();

        let names: Vec<String> = REGISTRY
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.iter().any(|n| n == "ac_acl_sync_total"));
        assert!(names.iter().any(|n| n == "ac_network_connected"));

        let text = encode_metrics().unwrap();
        assert!(text.contains("ac_acl_sync_total{outcome=\"gather-test\"}"));
    }

    #[test]
    fn test_counter_increment() {
        MAILBOX_DROPS.with_label_values(&["metrics-test"]).inc();
        assert!(MAILBOX_DROPS.with_label_values(&["metrics-test"]).get() >= 1);
    }

    #[test]
    fn test_gauge_set() {
        NET_CONNECTED.set(1);
        assert!(NET_CONNECTED.get() >= 0);
    }
}
