//! # Network Orchestrator (ac-03)
//!
//! The single execution unit that owns connectivity. It consumes
//! [`Command`](shared_types::Command)s from its mailbox, brings the link up
//! and down, triggers ACL syncs and publishes status telemetry.
//!
//! ## Command Flow
//!
//! ```text
//! Connect ──► link up ──► Event::NetConnected ──► controller
//!                    └──► Init ──► DownloadAcl ──► SendAclUpdated | SendAclFailed
//! Disconnect ──► link down ──► Event::NetDisconnected ──► controller
//! ```
//!
//! ## Periodic Duties
//!
//! While connected, every loop iteration checks two deadlines: the ACL
//! refresh interval and the signal-strength report interval. A failed sync
//! is simply retried at the next refresh.
//!
//! ## Telemetry Topics
//!
//! | Subtopic | Payload |
//! |----------|---------|
//! | `acl/update` | `{"status": "downloaded" \| "failed"}` |
//! | `personality/access` | `{"member", "allowed"}` or `{"error", "errorText", "errorExt"}` |
//! | `wifi/status` | `{"level"}` |
//! | `system/power` | `{"state"}` |
//! | `alarm/door` | `{"state": "open" \| "closed"}` |

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::{LinkError, PublishError, UpdateError};
pub use domain::settings::{NetworkSettings, DEFAULT_TOPIC_BASE};
pub use domain::telemetry::{Report, Subtopic, TelemetryMessage, TopicBuilder};
pub use ports::outbound::{FirmwareUpdater, LinkPort, TelemetrySink};
pub use service::{NetworkOrchestrator, NetworkPorts};
