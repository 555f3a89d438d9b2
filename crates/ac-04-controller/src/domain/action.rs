//! Side effects requested by a transition.
//!
//! The transition function only returns these; the task applies them in
//! order through the ports.

use shared_types::Command;
use std::time::Duration;

/// Screens the annunciator can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Splash,
    Idle,
    Access,
    Info,
    Sleep,
    Ota,
}

/// Audio cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Boot,
    PreScan,
    Granted,
    Denied,
    UnknownTag,
    Relock,
}

/// One side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Engage the lock.
    Lock,
    /// Release the lock.
    Unlock,
    /// (Re)arm the one-shot timer. Replaces any pending expiry.
    ArmTimer(Duration),
    /// Cancel the one-shot timer.
    DisarmTimer,
    Show(Screen),
    /// Show the access result for a member.
    ShowAccess { name: String, allowed: bool },
    Tone(Cue),
    /// Queue a command to the Network Orchestrator.
    Network(Command),
    /// Suspend the platform. Returns on wake.
    Suspend,
    Reboot,
}
