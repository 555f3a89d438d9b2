//! # Outbound Ports (Driven Ports)
//!
//! GPIO, display, audio and power management are external drivers. The
//! controller calls them synchronously from its own task except for
//! `suspend`, which blocks until the device wakes.

use crate::domain::action::{Cue, Screen};
use crate::domain::errors::PlatformError;
use async_trait::async_trait;
use shared_types::{AuthorizationRecord, TagId};

/// Door lock actuator.
pub trait LockActuator: Send + Sync {
    fn engage(&self);
    fn release(&self);
}

/// Display and beeper.
pub trait Annunciator: Send + Sync {
    fn show(&self, screen: Screen);
    fn show_access(&self, name: &str, allowed: bool);
    fn tone(&self, cue: Cue);
}

/// Resolves a scanned tag against the cached authorization list.
pub trait CredentialSource: Send + Sync {
    /// `None` when the tag is not listed or no trusted list is available.
    fn lookup(&self, tag_id: TagId) -> Option<AuthorizationRecord>;
}

/// Power management.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Put the whole device to sleep. Returns once it is awake again.
    async fn suspend(&self) -> Result<(), PlatformError>;

    /// Restart into the newly installed firmware.
    fn reboot(&self);
}
