//! # Domain Errors
//!
//! None of these stop the orchestrator. Each is logged, counted where a
//! metric exists, and the command loop moves on.

use thiserror::Error;

/// Errors from the network link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The link could not be brought up.
    #[error("Link connect failed: {0}")]
    ConnectFailed(String),

    /// The link could not be taken down cleanly.
    #[error("Link disconnect failed: {0}")]
    DisconnectFailed(String),

    /// The radio has not been started.
    #[error("Link not started")]
    NotStarted,
}

/// Errors from publishing a telemetry message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// No broker session is open.
    #[error("Telemetry sink not connected")]
    NotConnected,

    /// The broker rejected or lost the message.
    #[error("Publish to {topic} failed: {reason}")]
    Rejected { topic: String, reason: String },
}

/// Errors from a firmware update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// Image download failed.
    #[error("Firmware download failed: {0}")]
    Download(String),

    /// The downloaded image could not be applied.
    #[error("Firmware image rejected: {0}")]
    Rejected(String),
}
