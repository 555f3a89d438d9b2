//! # Transition Function
//!
//! Each loop iteration calls [`Controller::step`] once with at most one
//! event. A step does two things:
//!
//! 1. State-independent handling: power, battery, link, door and OTA events
//!    update the flags and emit telemetry whatever the current state.
//! 2. Exactly one state-dependent transition on `(state, event)`.
//!
//! Transient states (`Init`, `InitialLock`, `StartRfidRead`, `RfidValid`,
//! `RfidInvalid`, `Lock`, `GoToSleep`, `Sleeping`, `WakeUp`, `ShowInfo`)
//! perform their entry work and move on without waiting for an event.
//! Every other `(state, event)` pair not listed falls through to a no-op.

use access_telemetry::{ACCESS_DECISIONS, STATE_TRANSITIONS};
use shared_types::{tag_string, Command, Event, PowerStatus, TagId};
use tracing::{debug, error, info, warn};

use crate::domain::action::{Action, Cue, Screen};
use crate::domain::state::ControllerState;
use crate::domain::timing::ControllerTimings;
use crate::ports::outbound::CredentialSource;

/// Error text reported for tags that are not on the list.
pub const UNKNOWN_TAG_ERROR: &str = "unknown rfid tag";

/// Name shown for tags that are not on the list.
pub const UNKNOWN_TAG_NAME: &str = "Unknown RFID";

/// Connectivity flags. Only [`Controller::step`] mutates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    pub power_ok: bool,
    pub battery_low: bool,
    pub net_connected: bool,
    pub door_open: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            power_ok: true,
            battery_low: false,
            net_connected: false,
            door_open: false,
        }
    }
}

impl Flags {
    /// Power state as reported in telemetry.
    pub fn power_status(&self) -> PowerStatus {
        match (self.power_ok, self.battery_low) {
            (true, _) => PowerStatus::OnExternal,
            (false, false) => PowerStatus::OnBattery,
            (false, true) => PowerStatus::OnBatteryLow,
        }
    }
}

/// The Main Controller state machine.
#[derive(Debug, Clone)]
pub struct Controller {
    state: ControllerState,
    flags: Flags,
    timings: ControllerTimings,
    /// Tag from the scan being evaluated.
    pending_tag: Option<TagId>,
    /// The battery grace timer is running in `WaitRfid`.
    power_timer_armed: bool,
}

impl Controller {
    pub fn new(timings: ControllerTimings) -> Self {
        Self {
            state: ControllerState::Init,
            flags: Flags::default(),
            timings,
            pending_tag: None,
            power_timer_armed: false,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn timings(&self) -> &ControllerTimings {
        &self.timings
    }

    /// Apply one event (or none) and return the side effects, in order.
    pub fn step(
        &mut self,
        event: Option<Event>,
        credentials: &dyn CredentialSource,
    ) -> Vec<Action> {
        let mut actions = Vec::new();

        if let Some(event) = &event {
            debug!(event = event.name(), state = %self.state, "Controller event");
            self.apply_flags(event, &mut actions);
        }

        let next = self.transition(event.as_ref(), credentials, &mut actions);
        if next != self.state {
            info!("State change: {} -> {}", self.state, next);
            STATE_TRANSITIONS.with_label_values(&[next.as_str()]).inc();
            self.state = next;
        }

        actions
    }

    fn apply_flags(&mut self, event: &Event, actions: &mut Vec<Action>) {
        match event {
            Event::PowerLoss => {
                warn!("External power lost");
                self.flags.power_ok = false;
                actions.push(Action::Network(Command::SendPowerStatus(
                    self.flags.power_status(),
                )));
            }
            Event::PowerRestored => {
                info!("External power restored");
                self.flags.power_ok = true;
                actions.push(Action::Network(Command::SendPowerStatus(
                    self.flags.power_status(),
                )));
            }
            Event::BatteryLow => {
                warn!("Battery low");
                self.flags.battery_low = true;
                actions.push(Action::Network(Command::SendPowerStatus(
                    self.flags.power_status(),
                )));
            }
            Event::BatteryOk => {
                self.flags.battery_low = false;
                actions.push(Action::Network(Command::SendPowerStatus(
                    self.flags.power_status(),
                )));
            }
            Event::NetConnected => self.flags.net_connected = true,
            Event::NetDisconnected => self.flags.net_connected = false,
            Event::DoorOpened => {
                self.flags.door_open = true;
                actions.push(Action::Network(Command::SendDoorState(true)));
            }
            Event::DoorClosed => {
                self.flags.door_open = false;
                actions.push(Action::Network(Command::SendDoorState(false)));
            }
            Event::OtaUpdate => {
                info!("Firmware update requested");
                actions.push(Action::Show(Screen::Ota));
                actions.push(Action::Network(Command::OtaUpdate));
            }
            Event::OtaUpdateSucceeded => {
                warn!("Firmware update applied, rebooting");
                actions.push(Action::Reboot);
            }
            Event::OtaUpdateFailed => {
                error!("Firmware update failed");
                actions.push(Action::Show(Screen::Idle));
            }
            Event::TimerExpired
            | Event::RfidPreScan
            | Event::ValidScan { .. }
            | Event::InvalidScan { .. }
            | Event::ButtonPressed => {}
        }
    }

    fn transition(
        &mut self,
        event: Option<&Event>,
        credentials: &dyn CredentialSource,
        actions: &mut Vec<Action>,
    ) -> ControllerState {
        use ControllerState as S;

        let timer = matches!(event, Some(Event::TimerExpired));
        let button = matches!(event, Some(Event::ButtonPressed));
        let t = self.timings;

        match self.state {
            S::Init => {
                actions.push(Action::Show(Screen::Splash));
                actions.push(Action::Tone(Cue::Boot));
                S::InitialLock
            }
            S::InitialLock => {
                actions.push(Action::Lock);
                actions.push(Action::Network(Command::Connect));
                actions.push(Action::ArmTimer(t.initial_lock));
                S::WaitRead
            }
            S::WaitRead if timer => S::StartRfidRead,
            S::StartRfidRead => {
                actions.push(Action::Show(Screen::Idle));
                S::WaitRfid
            }
            S::WaitRfid => self.wait_rfid(event, actions),
            S::RfidValid => self.resolve_scan(credentials, actions),
            S::RfidInvalid => {
                let tag_id = self.pending_tag.take().unwrap_or_default();
                self.reject_unknown(tag_id, actions)
            }
            S::Unlocked if timer => S::Lock,
            S::Unlocked if self.flags.door_open => {
                actions.push(Action::ArmTimer(t.unlock_open));
                S::UnlockedOpen
            }
            S::UnlockedOpen if timer => S::Lock,
            S::Lock => {
                actions.push(Action::Tone(Cue::Relock));
                actions.push(Action::Lock);
                actions.push(Action::ArmTimer(t.relock_hold));
                S::WaitRead
            }
            S::GoToSleep => {
                actions.push(Action::Network(Command::SendPowerStatus(PowerStatus::Sleep)));
                actions.push(Action::Show(Screen::Sleep));
                actions.push(Action::ArmTimer(t.pre_sleep));
                S::PreSleep1
            }
            S::PreSleep1 | S::PreSleep2 if self.flags.power_ok => {
                info!("Power restored, sleep aborted");
                actions.push(Action::DisarmTimer);
                actions.push(Action::Network(Command::Connect));
                S::StartRfidRead
            }
            S::PreSleep1 if timer => {
                actions.push(Action::Network(Command::Disconnect));
                actions.push(Action::ArmTimer(t.sleep_poll));
                S::PreSleep2
            }
            S::PreSleep2 if timer => {
                if self.flags.net_connected {
                    debug!("Waiting for network to go down before sleeping");
                    actions.push(Action::ArmTimer(t.sleep_poll));
                    S::PreSleep2
                } else {
                    actions.push(Action::Suspend);
                    S::Sleeping
                }
            }
            // The suspend action has returned by the time this runs.
            S::Sleeping => S::WakeUp,
            S::WakeUp => {
                actions.push(Action::Network(Command::Connect));
                actions.push(Action::Network(Command::SendPowerStatus(PowerStatus::Wake)));
                actions.push(Action::Show(Screen::Idle));
                actions.push(Action::ArmTimer(t.wake_reconnect));
                S::Waking
            }
            S::Waking if self.flags.net_connected => {
                actions.push(Action::DisarmTimer);
                S::StartRfidRead
            }
            S::Waking if timer => {
                warn!("No reconnection after wake, resuming reads");
                S::StartRfidRead
            }
            S::ShowInfo => {
                actions.push(Action::Show(Screen::Info));
                actions.push(Action::ArmTimer(t.info));
                S::ShowingInfo
            }
            S::ShowingInfo if timer => S::StartRfidRead,
            S::ShowingInfo if button => {
                actions.push(Action::DisarmTimer);
                S::StartRfidRead
            }
            state => state,
        }
    }

    fn wait_rfid(&mut self, event: Option<&Event>, actions: &mut Vec<Action>) -> ControllerState {
        match event {
            Some(Event::ValidScan { tag_id }) => {
                self.leave_wait_rfid(actions);
                self.pending_tag = Some(*tag_id);
                actions.push(Action::Show(Screen::Access));
                return ControllerState::RfidValid;
            }
            Some(Event::InvalidScan { tag_id }) => {
                self.leave_wait_rfid(actions);
                self.pending_tag = Some(*tag_id);
                actions.push(Action::Show(Screen::Access));
                return ControllerState::RfidInvalid;
            }
            Some(Event::ButtonPressed) => {
                self.leave_wait_rfid(actions);
                return ControllerState::ShowInfo;
            }
            Some(Event::RfidPreScan) => actions.push(Action::Tone(Cue::PreScan)),
            Some(Event::TimerExpired) if self.power_timer_armed && !self.flags.power_ok => {
                warn!(
                    grace_secs = self.timings.power_lost_grace.as_secs(),
                    "Still on battery after grace period, going to sleep"
                );
                self.power_timer_armed = false;
                return ControllerState::GoToSleep;
            }
            _ => {}
        }

        // The grace timer follows the live power flag.
        if !self.flags.power_ok && !self.power_timer_armed {
            info!("Running on battery, sleep pending");
            actions.push(Action::ArmTimer(self.timings.power_lost_grace));
            self.power_timer_armed = true;
        } else if self.flags.power_ok && self.power_timer_armed {
            actions.push(Action::DisarmTimer);
            self.power_timer_armed = false;
        }

        ControllerState::WaitRfid
    }

    fn leave_wait_rfid(&mut self, actions: &mut Vec<Action>) {
        if self.power_timer_armed {
            actions.push(Action::DisarmTimer);
            self.power_timer_armed = false;
        }
    }

    fn resolve_scan(
        &mut self,
        credentials: &dyn CredentialSource,
        actions: &mut Vec<Action>,
    ) -> ControllerState {
        let Some(tag_id) = self.pending_tag.take() else {
            warn!("Valid scan without a tag id");
            return self.reject_unknown(0, actions);
        };

        match credentials.lookup(tag_id) {
            Some(record) if record.allowed => {
                info!(member = %record.display_name, "Member allowed");
                ACCESS_DECISIONS.with_label_values(&["granted"]).inc();
                actions.push(Action::ShowAccess {
                    name: record.display_name.clone(),
                    allowed: true,
                });
                actions.push(Action::Tone(Cue::Granted));
                actions.push(Action::Unlock);
                actions.push(Action::ArmTimer(self.timings.unlock));
                actions.push(Action::Network(Command::SendAccess {
                    member: record.display_name,
                    allowed: true,
                }));
                ControllerState::Unlocked
            }
            Some(record) => {
                info!(member = %record.display_name, "Member denied");
                ACCESS_DECISIONS.with_label_values(&["denied"]).inc();
                actions.push(Action::ShowAccess {
                    name: record.display_name.clone(),
                    allowed: false,
                });
                actions.push(Action::Tone(Cue::Denied));
                actions.push(Action::ArmTimer(self.timings.denied_hold));
                actions.push(Action::Network(Command::SendAccess {
                    member: record.display_name,
                    allowed: false,
                }));
                ControllerState::WaitRead
            }
            None => self.reject_unknown(tag_id, actions),
        }
    }

    fn reject_unknown(&mut self, tag_id: TagId, actions: &mut Vec<Action>) -> ControllerState {
        let tag = tag_string(tag_id);
        info!(tag = %tag, "Unknown tag denied");
        ACCESS_DECISIONS.with_label_values(&["unknown"]).inc();

        actions.push(Action::ShowAccess {
            name: UNKNOWN_TAG_NAME.to_string(),
            allowed: false,
        });
        actions.push(Action::Tone(Cue::UnknownTag));
        actions.push(Action::Network(Command::SendAccessError {
            error: UNKNOWN_TAG_ERROR.to_string(),
            detail: tag,
        }));
        actions.push(Action::ArmTimer(self.timings.invalid_hold));
        ControllerState::WaitRead
    }

    #[cfg(test)]
    pub(crate) fn with_state(state: ControllerState, flags: Flags) -> Self {
        Self {
            state,
            flags,
            ..Self::new(ControllerTimings::default())
        }
    }
}
