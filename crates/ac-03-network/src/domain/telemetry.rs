//! # Telemetry Reports
//!
//! Status reports published by the orchestrator. Every report lands on
//! `<base>/status/node/<node-id>/<subtopic>` with a small JSON object as
//! payload.

use serde::Serialize;
use serde_json::{json, Value};
use shared_types::{Command, PowerStatus};

/// Topic type segment for status reports.
pub const STATUS_TOPIC_TYPE: &str = "status";

/// Last topic segments, one per report kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subtopic {
    AclUpdate,
    PersonalityAccess,
    WifiStatus,
    SystemPower,
    AlarmDoor,
}

impl Subtopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subtopic::AclUpdate => "acl/update",
            Subtopic::PersonalityAccess => "personality/access",
            Subtopic::WifiStatus => "wifi/status",
            Subtopic::SystemPower => "system/power",
            Subtopic::AlarmDoor => "alarm/door",
        }
    }
}

/// Builds node-targeted topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicBuilder {
    base: String,
    node_id: String,
}

impl TopicBuilder {
    pub fn new(base: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            node_id: node_id.into(),
        }
    }

    /// Full status topic for `subtopic`.
    pub fn status(&self, subtopic: Subtopic) -> String {
        format!(
            "{}/{}/node/{}/{}",
            self.base,
            STATUS_TOPIC_TYPE,
            self.node_id,
            subtopic.as_str()
        )
    }
}

/// A report to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Outcome of an ACL sync.
    AclUpdate { ok: bool },
    /// Access decision for a known member.
    Access { member: String, allowed: bool },
    /// Access error such as an unknown tag.
    AccessError { error: String, detail: String },
    /// Received signal strength in dBm.
    WifiStatus { level: i32 },
    /// Power source state.
    Power(PowerStatus),
    /// Door contact state.
    Door { open: bool },
}

impl Report {
    /// Translate a command into the report it asks for.
    ///
    /// Returns `None` for commands that are not reports, and for
    /// `SendWifiStrength`, which needs a live reading.
    pub fn from_command(command: &Command) -> Option<Self> {
        match command {
            Command::SendAclUpdated => Some(Report::AclUpdate { ok: true }),
            Command::SendAclFailed => Some(Report::AclUpdate { ok: false }),
            Command::SendAccess { member, allowed } => Some(Report::Access {
                member: member.clone(),
                allowed: *allowed,
            }),
            Command::SendAccessError { error, detail } => Some(Report::AccessError {
                error: error.clone(),
                detail: detail.clone(),
            }),
            Command::SendPowerStatus(status) => Some(Report::Power(*status)),
            Command::SendDoorState(open) => Some(Report::Door { open: *open }),
            _ => None,
        }
    }

    pub fn subtopic(&self) -> Subtopic {
        match self {
            Report::AclUpdate { .. } => Subtopic::AclUpdate,
            Report::Access { .. } | Report::AccessError { .. } => Subtopic::PersonalityAccess,
            Report::WifiStatus { .. } => Subtopic::WifiStatus,
            Report::Power(_) => Subtopic::SystemPower,
            Report::Door { .. } => Subtopic::AlarmDoor,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Report::AclUpdate { ok } => {
                json!({ "status": if *ok { "downloaded" } else { "failed" } })
            }
            Report::Access { member, allowed } => json!({ "member": member, "allowed": allowed }),
            Report::AccessError { error, detail } => json!({
                "error": true,
                "errorText": error,
                "errorExt": detail,
            }),
            Report::WifiStatus { level } => json!({ "level": level }),
            Report::Power(status) => json!({ "state": status.as_str() }),
            Report::Door { open } => json!({ "state": if *open { "open" } else { "closed" } }),
        }
    }

    /// Render against a topic builder.
    pub fn into_message(self, topics: &TopicBuilder) -> TelemetryMessage {
        TelemetryMessage {
            topic: topics.status(self.subtopic()),
            payload: self.payload(),
        }
    }
}

/// A rendered message ready for the sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryMessage {
    pub topic: String,
    pub payload: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics() -> TopicBuilder {
        TopicBuilder::new("ratt", "a1b2c3d4e5f6")
    }

    #[test]
    fn test_topic_layout() {
        assert_eq!(
            topics().status(Subtopic::AclUpdate),
            "ratt/status/node/a1b2c3d4e5f6/acl/update"
        );
    }

    #[test]
    fn test_access_error_payload() {
        let msg = Report::from_command(&Command::SendAccessError {
            error: "unknown rfid tag".into(),
            detail: "0000000042".into(),
        })
        .unwrap()
        .into_message(&topics());

        assert_eq!(msg.topic, "ratt/status/node/a1b2c3d4e5f6/personality/access");
        assert_eq!(msg.payload["error"], true);
        assert_eq!(msg.payload["errorText"], "unknown rfid tag");
        assert_eq!(msg.payload["errorExt"], "0000000042");
    }

    #[test]
    fn test_acl_and_door_payloads() {
        assert_eq!(
            Report::AclUpdate { ok: false }.payload(),
            json!({ "status": "failed" })
        );
        assert_eq!(Report::Door { open: true }.payload(), json!({ "state": "open" }));
        assert_eq!(
            Report::Power(PowerStatus::OnBatteryLow).payload(),
            json!({ "state": "on_battery_low" })
        );
    }

    #[test]
    fn test_non_report_commands() {
        assert_eq!(Report::from_command(&Command::Connect), None);
        assert_eq!(Report::from_command(&Command::SendWifiStrength), None);
    }
}
