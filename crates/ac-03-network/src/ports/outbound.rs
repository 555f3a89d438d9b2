//! # Outbound Ports (Driven Ports)
//!
//! The radio, the broker session and the firmware updater are external
//! stacks. The orchestrator only sequences them.

use crate::domain::errors::{LinkError, PublishError, UpdateError};
use crate::domain::telemetry::TelemetryMessage;
use async_trait::async_trait;

/// Network link (station radio + IP).
#[async_trait]
pub trait LinkPort: Send + Sync {
    /// Bring the link up and wait for an address.
    async fn connect(&self) -> Result<(), LinkError>;

    /// Take the link down.
    async fn disconnect(&self) -> Result<(), LinkError>;

    /// Current received signal strength in dBm, if associated.
    fn signal_strength(&self) -> Option<i32>;
}

/// Publishes telemetry to the broker.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn publish(&self, message: &TelemetryMessage) -> Result<(), PublishError>;
}

/// Downloads and stages a firmware image.
#[async_trait]
pub trait FirmwareUpdater: Send + Sync {
    async fn update(&self) -> Result<(), UpdateError>;
}
