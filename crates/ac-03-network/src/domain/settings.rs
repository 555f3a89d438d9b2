//! Orchestrator settings.

use std::time::Duration;

/// Base of every published topic.
pub const DEFAULT_TOPIC_BASE: &str = "ratt";

/// Tuning for the orchestrator loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSettings {
    /// Mailbox poll timeout per loop iteration.
    pub poll_interval: Duration,
    /// Interval between ACL resyncs while connected.
    pub acl_refresh_interval: Duration,
    /// Interval between signal-strength reports while connected.
    pub wifi_report_interval: Duration,
    /// First topic segment.
    pub topic_base: String,
    /// Node identifier, normally the station MAC in lower-case hex.
    pub node_id: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(20),
            acl_refresh_interval: Duration::from_secs(15 * 60),
            wifi_report_interval: Duration::from_secs(60),
            topic_base: DEFAULT_TOPIC_BASE.to_string(),
            node_id: "000000000000".to_string(),
        }
    }
}
