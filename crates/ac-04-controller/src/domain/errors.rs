//! Controller errors. None of them stop the state machine.

use thiserror::Error;

/// Errors from the platform port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// A registered unit is still busy.
    #[error("Suspend refused, busy units: {}", .busy.join(", "))]
    NotQuiescent { busy: Vec<&'static str> },

    /// The platform failed to enter sleep.
    #[error("Suspend failed: {0}")]
    SuspendFailed(String),
}
