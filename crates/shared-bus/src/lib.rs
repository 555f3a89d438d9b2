//! # Shared Bus - Mailboxes Between Execution Units
//!
//! Every cross-unit interaction in the controller is a message send into the
//! receiving unit's mailbox.
//!
//! ## Rules
//!
//! - Each unit owns exactly one bounded mailbox; capacity is the
//!   backpressure bound.
//! - Every operation carries a timeout. Nothing waits forever.
//! - A full mailbox drops the message with a warning; the sender gets the
//!   message back and carries on.
//! - Delivery is FIFO within one mailbox. There is no ordering across
//!   mailboxes.
//!
//! ```text
//! ┌──────────────┐   post(Command)   ┌──────────────────┐
//! │  Controller  │ ────────────────► │ network mailbox  │──► Network unit
//! │              │ ◄──────────────── │                  │
//! └──────────────┘   post(Event)     └──────────────────┘
//!        ▲
//!        └── controller mailbox ◄── reader, power monitor, door contact
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod errors;
pub mod mailbox;
pub mod quiescence;

// Re-export main types
pub use errors::{BusError, SendError};
pub use mailbox::{open, open_or_degraded, MailboxReceiver, MailboxSender};
pub use quiescence::{ActivityHandle, BusyGuard, QuiescenceRegistry};

use std::time::Duration;

/// Upper bound on mailbox depth.
pub const MAX_MAILBOX_CAPACITY: usize = 64;

/// How long a sender waits for a free slot before dropping.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(250);

/// Default depth of the controller and network mailboxes.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_within_bounds() {
        assert!(DEFAULT_MAILBOX_CAPACITY <= MAX_MAILBOX_CAPACITY);
        assert_eq!(DEFAULT_SEND_TIMEOUT, Duration::from_millis(250));
    }
}
