//! Controller states.

use std::fmt;

/// Exactly one state is active at a time.
///
/// The machine runs forever; `Init` is entered once at boot and the rest
/// form a cycle through the read loop and the sleep path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControllerState {
    #[default]
    Init,
    InitialLock,
    WaitRead,
    StartRfidRead,
    WaitRfid,
    RfidValid,
    RfidInvalid,
    Unlocked,
    UnlockedOpen,
    Lock,
    GoToSleep,
    PreSleep1,
    PreSleep2,
    Sleeping,
    WakeUp,
    Waking,
    ShowInfo,
    ShowingInfo,
}

impl ControllerState {
    /// Every state, in declaration order.
    pub const ALL: [ControllerState; 18] = [
        ControllerState::Init,
        ControllerState::InitialLock,
        ControllerState::WaitRead,
        ControllerState::StartRfidRead,
        ControllerState::WaitRfid,
        ControllerState::RfidValid,
        ControllerState::RfidInvalid,
        ControllerState::Unlocked,
        ControllerState::UnlockedOpen,
        ControllerState::Lock,
        ControllerState::GoToSleep,
        ControllerState::PreSleep1,
        ControllerState::PreSleep2,
        ControllerState::Sleeping,
        ControllerState::WakeUp,
        ControllerState::Waking,
        ControllerState::ShowInfo,
        ControllerState::ShowingInfo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerState::Init => "init",
            ControllerState::InitialLock => "initial_lock",
            ControllerState::WaitRead => "wait_read",
            ControllerState::StartRfidRead => "start_rfid_read",
            ControllerState::WaitRfid => "wait_rfid",
            ControllerState::RfidValid => "rfid_valid",
            ControllerState::RfidInvalid => "rfid_invalid",
            ControllerState::Unlocked => "unlocked",
            ControllerState::UnlockedOpen => "unlocked_open",
            ControllerState::Lock => "lock",
            ControllerState::GoToSleep => "go_to_sleep",
            ControllerState::PreSleep1 => "pre_sleep_1",
            ControllerState::PreSleep2 => "pre_sleep_2",
            ControllerState::Sleeping => "sleeping",
            ControllerState::WakeUp => "wake_up",
            ControllerState::Waking => "waking",
            ControllerState::ShowInfo => "show_info",
            ControllerState::ShowingInfo => "showing_info",
        }
    }

    /// Whether the door may be unlocked in this state.
    pub fn is_unlocked(&self) -> bool {
        matches!(self, ControllerState::Unlocked | ControllerState::UnlockedOpen)
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
