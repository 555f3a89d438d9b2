//! Timer periods used by the state machine.

use std::time::Duration;

/// All periods the controller arms its one-shot timer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerTimings {
    /// Wait after the boot lock before the first read.
    pub initial_lock: Duration,
    /// Auto-relock after a granted scan.
    pub unlock: Duration,
    /// Relock once the door has been seen open.
    pub unlock_open: Duration,
    /// Access screen hold after a denied member.
    pub denied_hold: Duration,
    /// Access screen hold after an unknown or invalid tag.
    pub invalid_hold: Duration,
    /// Hold after relocking.
    pub relock_hold: Duration,
    /// Informational overlay.
    pub info: Duration,
    /// Grace period on battery before going to sleep.
    pub power_lost_grace: Duration,
    /// Delay between announcing sleep and dropping the link.
    pub pre_sleep: Duration,
    /// Poll period while waiting for the link to drop.
    pub sleep_poll: Duration,
    /// Maximum wait for reconnection after wake.
    pub wake_reconnect: Duration,
}

impl Default for ControllerTimings {
    fn default() -> Self {
        Self {
            initial_lock: Duration::from_secs(3),
            unlock: Duration::from_secs(7),
            unlock_open: Duration::from_secs(1),
            denied_hold: Duration::from_secs(10),
            invalid_hold: Duration::from_secs(8),
            relock_hold: Duration::from_secs(10),
            info: Duration::from_secs(10),
            power_lost_grace: Duration::from_secs(30),
            pre_sleep: Duration::from_secs(2),
            sleep_poll: Duration::from_secs(1),
            wake_reconnect: Duration::from_secs(15),
        }
    }
}
