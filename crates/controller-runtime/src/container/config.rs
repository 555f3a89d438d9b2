//! # Controller Configuration
//!
//! Unified configuration for every unit. Defaults match the firmware; each
//! value can be overridden from an `AC_*` environment variable.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `AC_STORAGE_DIR` | `/config` |
//! | `AC_ACL_FILE` | `/config/acl.csv` |
//! | `AC_ACL_HASH_FILE` | `/config/acl.sha` |
//! | `AC_ACL_URL` | `https://my-server.org:443/auth/api/v0/resources/{resource}/acl` |
//! | `AC_ACL_RESOURCE` | `frontdoor` |
//! | `AC_API_USER` / `AC_API_PASSWORD` | `username` / `password` |
//! | `AC_ACL_REFRESH_SECS` | `900` |
//! | `AC_NODE_ID` | `000000000000` |
//! | `AC_TOPIC_BASE` | `ratt` |
//! | `AC_TLS_CERT` / `AC_TLS_KEY` / `AC_TLS_CA` | unset |

use std::path::PathBuf;
use std::time::Duration;

use ac_01_acl_integrity::AclPaths;
use ac_02_acl_sync::acl_url;
use ac_03_network::{NetworkSettings, DEFAULT_TOPIC_BASE};
use ac_04_controller::ControllerTimings;
use shared_bus::MAX_MAILBOX_CAPACITY;
use thiserror::Error;
use tracing::warn;

/// Complete controller configuration.
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    pub acl: AclConfig,
    pub sync: SyncConfig,
    pub network: NetworkConfig,
    pub timing: TimingConfig,
    pub mailbox: MailboxConfig,
    pub tls: TlsConfig,
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ACL URL template is empty")]
    EmptyUrlTemplate,

    #[error("Mailbox {mailbox} capacity {capacity} is outside 1..={max}")]
    InvalidCapacity {
        mailbox: &'static str,
        capacity: usize,
        max: usize,
    },

    #[error("{name} must be greater than zero")]
    ZeroInterval { name: &'static str },

    #[error("TLS client certificate and key must be set together")]
    IncompleteIdentity,
}

impl ControllerConfig {
    /// Defaults overridden from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("AC_STORAGE_DIR") {
            config.acl.storage_dir = PathBuf::from(&dir);
            config.acl.acl_file = PathBuf::from(&dir).join("acl.csv");
            config.acl.hash_file = PathBuf::from(&dir).join("acl.sha");
        }
        if let Some(v) = lookup("AC_ACL_FILE") {
            config.acl.acl_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("AC_ACL_HASH_FILE") {
            config.acl.hash_file = PathBuf::from(v);
        }

        if let Some(v) = lookup("AC_ACL_URL") {
            config.sync.url_template = v;
        }
        if let Some(v) = lookup("AC_ACL_RESOURCE") {
            config.sync.resource = v;
        }
        if let Some(v) = lookup("AC_API_USER") {
            config.sync.api_user = v;
        }
        if let Some(v) = lookup("AC_API_PASSWORD") {
            config.sync.api_password = v;
        }
        parse_into(&lookup, "AC_ACL_REFRESH_SECS", &mut config.sync.acl_refresh_secs);
        parse_into(&lookup, "AC_CONNECT_TIMEOUT_SECS", &mut config.sync.connect_timeout_secs);
        parse_into(&lookup, "AC_REQUEST_TIMEOUT_SECS", &mut config.sync.request_timeout_secs);

        if let Some(v) = lookup("AC_NODE_ID") {
            config.network.node_id = v;
        }
        if let Some(v) = lookup("AC_TOPIC_BASE") {
            config.network.topic_base = v;
        }
        parse_into(&lookup, "AC_WIFI_REPORT_SECS", &mut config.network.wifi_report_secs);
        parse_into(&lookup, "AC_NETWORK_POLL_MS", &mut config.network.poll_ms);

        parse_into(&lookup, "AC_CONTROLLER_POLL_MS", &mut config.timing.poll_ms);
        parse_into(&lookup, "AC_UNLOCK_SECS", &mut config.timing.unlock_secs);
        parse_into(&lookup, "AC_POWER_GRACE_SECS", &mut config.timing.power_lost_grace_secs);

        parse_into(&lookup, "AC_CONTROLLER_MAILBOX", &mut config.mailbox.controller_depth);
        parse_into(&lookup, "AC_NETWORK_MAILBOX", &mut config.mailbox.network_depth);
        parse_into(&lookup, "AC_SEND_TIMEOUT_MS", &mut config.mailbox.send_timeout_ms);

        config.tls.client_cert = lookup("AC_TLS_CERT").map(PathBuf::from);
        config.tls.client_key = lookup("AC_TLS_KEY").map(PathBuf::from);
        config.tls.ca_cert = lookup("AC_TLS_CA").map(PathBuf::from);

        config
    }

    /// Reject settings the units cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.url_template.trim().is_empty() {
            return Err(ConfigError::EmptyUrlTemplate);
        }
        for (mailbox, capacity) in [
            ("controller", self.mailbox.controller_depth),
            ("network", self.mailbox.network_depth),
        ] {
            if capacity == 0 || capacity > MAX_MAILBOX_CAPACITY {
                return Err(ConfigError::InvalidCapacity {
                    mailbox,
                    capacity,
                    max: MAX_MAILBOX_CAPACITY,
                });
            }
        }
        if self.sync.acl_refresh_secs == 0 {
            return Err(ConfigError::ZeroInterval {
                name: "ACL refresh interval",
            });
        }
        if self.network.wifi_report_secs == 0 {
            return Err(ConfigError::ZeroInterval {
                name: "Wi-Fi report interval",
            });
        }
        if self.timing.poll_ms == 0 || self.network.poll_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                name: "poll interval",
            });
        }
        if self.tls.client_cert.is_some() != self.tls.client_key.is_some() {
            return Err(ConfigError::IncompleteIdentity);
        }
        Ok(())
    }
}

fn parse_into<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    if let Some(raw) = lookup(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!(key, value = %raw, "Ignoring unparsable setting"),
        }
    }
}

/// Location of the stored ACL pair.
#[derive(Debug, Clone)]
pub struct AclConfig {
    /// Storage mount; the process lock lives here.
    pub storage_dir: PathBuf,
    pub acl_file: PathBuf,
    pub hash_file: PathBuf,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("/config"),
            acl_file: PathBuf::from("/config/acl.csv"),
            hash_file: PathBuf::from("/config/acl.sha"),
        }
    }
}

impl AclConfig {
    pub fn paths(&self) -> AclPaths {
        AclPaths::new(&self.acl_file, &self.hash_file)
    }
}

/// Sync client settings.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub url_template: String,
    pub resource: String,
    /// Empty disables basic auth.
    pub api_user: String,
    pub api_password: String,
    pub acl_refresh_secs: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            url_template: "https://my-server.org:443/auth/api/v0/resources/{resource}/acl"
                .to_string(),
            resource: "frontdoor".to_string(),
            api_user: "username".to_string(),
            api_password: "password".to_string(),
            acl_refresh_secs: 900,
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}

impl SyncConfig {
    /// ACL URL with the resource substituted.
    pub fn acl_url(&self) -> String {
        acl_url(&self.url_template, &self.resource)
    }
}

/// Network orchestrator settings.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub node_id: String,
    pub topic_base: String,
    pub wifi_report_secs: u64,
    pub poll_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_id: "000000000000".to_string(),
            topic_base: DEFAULT_TOPIC_BASE.to_string(),
            wifi_report_secs: 60,
            poll_ms: 20,
        }
    }
}

/// Controller loop and timer settings.
#[derive(Debug, Clone)]
pub struct TimingConfig {
    pub poll_ms: u64,
    pub unlock_secs: u64,
    pub power_lost_grace_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        let timings = ControllerTimings::default();
        Self {
            poll_ms: 20,
            unlock_secs: timings.unlock.as_secs(),
            power_lost_grace_secs: timings.power_lost_grace.as_secs(),
        }
    }
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    pub fn controller_timings(&self) -> ControllerTimings {
        ControllerTimings {
            unlock: Duration::from_secs(self.unlock_secs),
            power_lost_grace: Duration::from_secs(self.power_lost_grace_secs),
            ..ControllerTimings::default()
        }
    }
}

/// Mailbox depths and send timeout.
#[derive(Debug, Clone)]
pub struct MailboxConfig {
    pub controller_depth: usize,
    pub network_depth: usize,
    pub send_timeout_ms: u64,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            controller_depth: 8,
            network_depth: 8,
            send_timeout_ms: 250,
        }
    }
}

impl MailboxConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

/// PEM files for mutual TLS. Loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
    pub ca_cert: Option<PathBuf>,
}

impl ControllerConfig {
    /// Orchestrator settings derived from this configuration.
    pub fn network_settings(&self) -> NetworkSettings {
        NetworkSettings {
            poll_interval: Duration::from_millis(self.network.poll_ms),
            acl_refresh_interval: Duration::from_secs(self.sync.acl_refresh_secs),
            wifi_report_interval: Duration::from_secs(self.network.wifi_report_secs),
            topic_base: self.network.topic_base.clone(),
            node_id: self.network.node_id.clone(),
        }
    }
}
