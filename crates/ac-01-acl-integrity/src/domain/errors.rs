//! # Domain Errors
//!
//! Error types for ACL integrity checks and installation.
//!
//! Every variant except `Io` during a plain read means the stored pair was
//! purged before the error was returned.

use shared_types::{Digest, DigestError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from validating, installing or purging the stored ACL.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// No digest file is stored. Expected on first boot.
    #[error("ACL digest not provisioned at {path}")]
    DigestMissing { path: PathBuf },

    /// The digest file is not 56 hex characters.
    #[error("ACL digest at {path} is malformed: {reason}")]
    DigestMalformed { path: PathBuf, reason: DigestError },

    /// The blob does not hash to the stored digest.
    #[error("ACL digest mismatch: expected {expected}, computed {actual}")]
    Mismatch { expected: Digest, actual: Digest },

    /// A filesystem operation failed.
    #[error("ACL {op} failed for {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IntegrityError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        IntegrityError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Metric label for this failure.
    pub fn reason(&self) -> &'static str {
        match self {
            IntegrityError::DigestMissing { .. } => "missing_digest",
            IntegrityError::DigestMalformed { .. } => "malformed_digest",
            IntegrityError::Mismatch { .. } => "mismatch",
            IntegrityError::Io { .. } => "io",
        }
    }

    /// Whether this is the first-boot case rather than corruption.
    pub fn is_not_provisioned(&self) -> bool {
        matches!(self, IntegrityError::DigestMissing { .. })
    }
}
