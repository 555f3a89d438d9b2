//! # Error Types
//!
//! Defines error types used across units.

use thiserror::Error;

/// Errors produced when parsing a digest from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    /// Digest text has the wrong number of characters.
    #[error("Invalid digest length: expected {expected} hex chars, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Digest text contains a non-hex character.
    #[error("Invalid digest: non-hex character at offset {offset}")]
    NonHex { offset: usize },
}

/// Operational state of a unit as reported to the quiescence registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitActivity {
    /// Safe to suspend.
    Idle,
    /// Performing work that must not be interrupted by a suspend.
    Busy,
}
