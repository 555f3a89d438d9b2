//! Mailbox errors.

use thiserror::Error;

/// Errors from opening or draining a mailbox.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// Requested capacity is zero or above the supported bound.
    #[error("Mailbox {mailbox}: invalid capacity {capacity} (must be 1..={max})")]
    InvalidCapacity {
        mailbox: &'static str,
        capacity: usize,
        max: usize,
    },

    /// Every sender was dropped.
    #[error("Mailbox {mailbox} closed")]
    Closed { mailbox: &'static str },
}

/// A message that could not be delivered, handed back to the sender.
#[derive(Debug, Error)]
pub enum SendError<T> {
    /// No slot freed up within the timeout.
    #[error("Mailbox {mailbox} full")]
    Full { mailbox: &'static str, message: T },

    /// The receiving unit is gone.
    #[error("Mailbox {mailbox} closed")]
    Closed { mailbox: &'static str, message: T },
}

impl<T> SendError<T> {
    /// Recover the undelivered message.
    pub fn into_inner(self) -> T {
        match self {
            SendError::Full { message, .. } | SendError::Closed { message, .. } => message,
        }
    }

    /// Whether the failure was backpressure rather than a closed mailbox.
    pub fn is_full(&self) -> bool {
        matches!(self, SendError::Full { .. })
    }
}
