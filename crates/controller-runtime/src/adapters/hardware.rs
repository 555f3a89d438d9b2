//! Host stand-ins for the door hardware.
//!
//! The lock relay, display, beeper and sleep controller are board
//! peripherals. On a host build they are logged so the controller can run
//! end to end.

use std::sync::atomic::{AtomicBool, Ordering};

use ac_04_controller::{Annunciator, Cue, LockActuator, Platform, PlatformError, Screen};
use async_trait::async_trait;
use tracing::info;

/// Lock relay that records its position in the log.
#[derive(Debug, Default)]
pub struct LoggingLock {
    released: AtomicBool,
}

impl LoggingLock {
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl LockActuator for LoggingLock {
    fn engage(&self) {
        self.released.store(false, Ordering::SeqCst);
        info!(target: "hardware", "Door locked");
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
        info!(target: "hardware", "Door unlocked");
    }
}

/// Display and beeper.
#[derive(Debug, Default)]
pub struct LoggingAnnunciator;

impl Annunciator for LoggingAnnunciator {
    fn show(&self, screen: Screen) {
        info!(target: "hardware", screen = ?screen, "Display");
    }

    fn show_access(&self, name: &str, allowed: bool) {
        info!(target: "hardware", member = name, allowed, "Display access result");
    }

    fn tone(&self, cue: Cue) {
        info!(target: "hardware", cue = ?cue, "Beep");
    }
}

/// Platform that cannot actually sleep; suspend returns at once.
#[derive(Debug, Default)]
pub struct HostPlatform;

#[async_trait]
impl Platform for HostPlatform {
    async fn suspend(&self) -> Result<(), PlatformError> {
        info!(target: "hardware", "Suspend requested, host build wakes immediately");
        Ok(())
    }

    fn reboot(&self) {
        info!(target: "hardware", "Reboot requested");
    }
}
