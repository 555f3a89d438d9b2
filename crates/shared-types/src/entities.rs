//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Credentials**: `AuthorizationRecord`, `TagId`
//! - **Integrity**: `Digest`, `ExpectedDigest`
//! - **Power**: `PowerStatus`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DigestError;

// =============================================================================
// CLUSTER A: CREDENTIALS
// =============================================================================

/// Identifier read from an RFID tag.
pub type TagId = u32;

/// Width of the zero-padded decimal rendering of a tag id.
pub const TAG_STRING_WIDTH: usize = 10;

/// Render a tag id as a fixed-width, zero-padded decimal string.
///
/// `42` renders as `"0000000042"`.
pub fn tag_string(tag_id: TagId) -> String {
    format!("{:0width$}", tag_id, width = TAG_STRING_WIDTH)
}

/// The resolved access decision for one presented credential.
///
/// Produced by the credential lookup collaborator and scoped to a single
/// evaluation cycle. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRecord {
    /// Tag the record was resolved for.
    pub tag_id: TagId,
    /// Name shown to the user and reported in telemetry.
    pub display_name: String,
    /// Whether the holder may enter.
    pub allowed: bool,
}

impl AuthorizationRecord {
    /// Create a new record.
    pub fn new(tag_id: TagId, display_name: impl Into<String>, allowed: bool) -> Self {
        Self {
            tag_id,
            display_name: display_name.into(),
            allowed,
        }
    }

    /// Zero-padded tag string for this record.
    pub fn tag_string(&self) -> String {
        tag_string(self.tag_id)
    }
}

// =============================================================================
// CLUSTER B: INTEGRITY
// =============================================================================

/// Length of a SHA-224 digest in bytes.
pub const DIGEST_LEN: usize = 28;

/// Length of a SHA-224 digest rendered as hex.
pub const DIGEST_HEX_LEN: usize = DIGEST_LEN * 2;

/// Header value sent when no digest is stored locally.
pub const NO_DIGEST: &str = "none";

/// A hex-encoded 224-bit digest of the authorization list.
///
/// Always exactly 56 lower-case hex characters. Comparison is plain string
/// equality: the digest is an integrity check, not a secret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest(String);

impl Digest {
    /// Build a digest from raw hash output.
    pub fn from_bytes(bytes: &[u8; DIGEST_LEN]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Parse a digest from its textual form.
    ///
    /// Only the canonical lower-case rendering is accepted, so two digests
    /// are equal exactly when their text is.
    pub fn parse(text: &str) -> Result<Self, DigestError> {
        if text.len() != DIGEST_HEX_LEN {
            return Err(DigestError::InvalidLength {
                expected: DIGEST_HEX_LEN,
                actual: text.len(),
            });
        }
        if let Some(offset) = text.bytes().position(|b| !is_lower_hex(b)) {
            return Err(DigestError::NonHex { offset });
        }
        Ok(Self(text.to_string()))
    }

    /// The hex text of this digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether `byte` is a hex digit as rendered by [`Digest::from_bytes`].
pub fn is_lower_hex(byte: u8) -> bool {
    matches!(byte, b'0'..=b'9' | b'a'..=b'f')
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The digest the client believes is current, or nothing on first boot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExpectedDigest {
    /// No digest file is stored.
    #[default]
    None,
    /// The stored digest.
    Known(Digest),
}

impl ExpectedDigest {
    /// Value attached to the conditional-fetch request header.
    pub fn header_value(&self) -> &str {
        match self {
            ExpectedDigest::None => NO_DIGEST,
            ExpectedDigest::Known(digest) => digest.as_str(),
        }
    }

    /// Whether `advertised` confirms this digest as current.
    ///
    /// A missing local digest is never confirmed, even if the server echoes
    /// the sentinel back.
    pub fn is_confirmed_by(&self, advertised: &str) -> bool {
        match self {
            ExpectedDigest::None => false,
            ExpectedDigest::Known(digest) => digest.as_str() == advertised,
        }
    }

    /// The known digest, if any.
    pub fn digest(&self) -> Option<&Digest> {
        match self {
            ExpectedDigest::None => None,
            ExpectedDigest::Known(digest) => Some(digest),
        }
    }
}

impl From<Option<Digest>> for ExpectedDigest {
    fn from(value: Option<Digest>) -> Self {
        value.map_or(ExpectedDigest::None, ExpectedDigest::Known)
    }
}

// =============================================================================
// CLUSTER C: POWER
// =============================================================================

/// Power state reported to the authority server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerStatus {
    /// Running from mains power.
    OnExternal,
    /// Mains lost, running from battery.
    OnBattery,
    /// Battery below the low-voltage threshold.
    OnBatteryLow,
    /// About to suspend.
    Sleep,
    /// Resumed from suspend.
    Wake,
}

impl PowerStatus {
    /// Wire name used in telemetry payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerStatus::OnExternal => "on_external",
            PowerStatus::OnBattery => "on_battery",
            PowerStatus::OnBatteryLow => "on_battery_low",
            PowerStatus::Sleep => "sleep",
            PowerStatus::Wake => "wake",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_string_is_zero_padded() {
        assert_eq!(tag_string(42), "0000000042");
        assert_eq!(tag_string(0), "0000000000");
        assert_eq!(tag_string(u32::MAX), "4294967295");
    }

    #[test]
    fn test_digest_parse_rejects_upper_case() {
        let lower = "a".repeat(DIGEST_HEX_LEN);
        assert_eq!(Digest::parse(&lower).unwrap().as_str(), lower);

        let mut text = lower.clone();
        text.replace_range(5..6, "A");
        assert!(matches!(
            Digest::parse(&text),
            Err(DigestError::NonHex { offset: 5 })
        ));
    }

    #[test]
    fn test_digest_parse_rejects_bad_input() {
        assert!(matches!(
            Digest::parse("abc"),
            Err(DigestError::InvalidLength { actual: 3, .. })
        ));

        let mut text = "0".repeat(DIGEST_HEX_LEN - 1);
        text.push('z');
        assert!(matches!(
            Digest::parse(&text),
            Err(DigestError::NonHex { offset }) if offset == DIGEST_HEX_LEN - 1
        ));
    }

    #[test]
    fn test_expected_digest_header_value() {
        assert_eq!(ExpectedDigest::None.header_value(), NO_DIGEST);

        let digest = Digest::from_bytes(&[0xAB; DIGEST_LEN]);
        let expected = ExpectedDigest::Known(digest.clone());
        assert_eq!(expected.header_value(), digest.as_str());
    }

    #[test]
    fn test_sentinel_never_confirms() {
        assert!(!ExpectedDigest::None.is_confirmed_by(NO_DIGEST));

        let digest = Digest::from_bytes(&[0x01; DIGEST_LEN]);
        let expected = ExpectedDigest::Known(digest.clone());
        assert!(expected.is_confirmed_by(digest.as_str()));
        assert!(!expected.is_confirmed_by(NO_DIGEST));
    }

    #[test]
    fn test_power_status_wire_names() {
        assert_eq!(PowerStatus::OnBatteryLow.as_str(), "on_battery_low");
        assert_eq!(PowerStatus::Wake.as_str(), "wake");
    }
}
