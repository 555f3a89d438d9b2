//! # Mailbox Messages
//!
//! Defines the messages carried by the two mailboxes of the controller.
//!
//! ## Design Rules
//!
//! - `Event` is consumed by the Main Controller, `Command` by the Network
//!   Orchestrator.
//! - Every variant owns its payload. A failed send hands the message back to
//!   the sender; nothing needs to be released by hand.
//! - At most two string payloads plus one small enum/boolean per command.

use crate::entities::{PowerStatus, TagId};
use serde::{Deserialize, Serialize};

// =============================================================================
// CONTROLLER MAILBOX
// =============================================================================

/// Events consumed by the Main Controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A firmware update was requested.
    OtaUpdate,
    /// The firmware update completed; a reboot is due.
    OtaUpdateSucceeded,
    /// The firmware update failed.
    OtaUpdateFailed,
    /// Network link is up.
    NetConnected,
    /// Network link is down.
    NetDisconnected,
    /// Battery dropped below the low threshold.
    BatteryLow,
    /// Battery recovered.
    BatteryOk,
    /// External power lost (debounced by the producer).
    PowerLoss,
    /// External power restored.
    PowerRestored,
    /// The controller's one-shot timer fired.
    TimerExpired,
    /// A tag entered the reader field; a full read is in progress.
    RfidPreScan,
    /// A tag was read with a valid checksum.
    ValidScan { tag_id: TagId },
    /// A tag was read but failed validation.
    InvalidScan { tag_id: TagId },
    /// The door contact reports open.
    DoorOpened,
    /// The door contact reports closed.
    DoorClosed,
    /// The user-interface button was pressed.
    ButtonPressed,
}

impl Event {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Event::OtaUpdate => "ota_update",
            Event::OtaUpdateSucceeded => "ota_update_succeeded",
            Event::OtaUpdateFailed => "ota_update_failed",
            Event::NetConnected => "net_connected",
            Event::NetDisconnected => "net_disconnected",
            Event::BatteryLow => "battery_low",
            Event::BatteryOk => "battery_ok",
            Event::PowerLoss => "power_loss",
            Event::PowerRestored => "power_restored",
            Event::TimerExpired => "timer_expired",
            Event::RfidPreScan => "rfid_pre_scan",
            Event::ValidScan { .. } => "valid_scan",
            Event::InvalidScan { .. } => "invalid_scan",
            Event::DoorOpened => "door_opened",
            Event::DoorClosed => "door_closed",
            Event::ButtonPressed => "button_pressed",
        }
    }
}

// =============================================================================
// NETWORK MAILBOX
// =============================================================================

/// Commands consumed by the Network Orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Post-connect initialisation.
    Init,
    /// Bring the link up.
    Connect,
    /// Take the link down.
    Disconnect,
    /// Run a conditional ACL sync.
    DownloadAcl,
    /// Report a successful ACL sync.
    SendAclUpdated,
    /// Report a failed ACL sync.
    SendAclFailed,
    /// Report current signal strength.
    SendWifiStrength,
    /// Report an access decision for a known member.
    SendAccess { member: String, allowed: bool },
    /// Report an access error, e.g. an unknown tag.
    SendAccessError { error: String, detail: String },
    /// Report the power state.
    SendPowerStatus(PowerStatus),
    /// Report the door contact state; `true` is open.
    SendDoorState(bool),
    /// Start a firmware update.
    OtaUpdate,
    /// Fetch a file over authenticated HTTPS.
    FetchFile { url: String, path: String },
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::Connect => "connect",
            Command::Disconnect => "disconnect",
            Command::DownloadAcl => "download_acl",
            Command::SendAclUpdated => "send_acl_updated",
            Command::SendAclFailed => "send_acl_failed",
            Command::SendWifiStrength => "send_wifi_strength",
            Command::SendAccess { .. } => "send_access",
            Command::SendAccessError { .. } => "send_access_error",
            Command::SendPowerStatus(_) => "send_power_status",
            Command::SendDoorState(_) => "send_door_state",
            Command::OtaUpdate => "ota_update",
            Command::FetchFile { .. } => "fetch_file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_value(Event::ValidScan { tag_id: 42 }).unwrap();
        assert_eq!(json["type"], "valid_scan");
        assert_eq!(json["tag_id"], 42);
    }

    #[test]
    fn test_command_names() {
        let cmd = Command::SendAccess {
            member: "Ada".into(),
            allowed: true,
        };
        assert_eq!(cmd.name(), "send_access");
        assert_eq!(Command::SendDoorState(true).name(), "send_door_state");
    }
}
