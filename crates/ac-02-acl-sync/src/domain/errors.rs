//! # Domain Errors
//!
//! A failed sync never installs anything. Every error below leaves the
//! previously installed pair as it was, except `Install`, where the store
//! has already purged the pair.

use ac_01_acl_integrity::IntegrityError;
use shared_types::Digest;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the HTTP transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The client could not be built (bad TLS material, bad settings).
    #[error("HTTP client setup failed: {0}")]
    Setup(String),

    /// No connection could be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other failure while sending or receiving.
    #[error("HTTP request failed: {0}")]
    Http(String),
}

/// Errors from a sync or file fetch.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport failed before or during the transfer.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Server answered with something other than 200.
    #[error("Server returned HTTP {status}")]
    Status { status: u16 },

    /// Server advertised one digest but sent a body hashing to another.
    #[error("Downloaded ACL digest {computed} does not match advertised {advertised}")]
    DigestMismatch { advertised: String, computed: Digest },

    /// Body ended before the advertised length.
    #[error("Transfer truncated: {received} of {expected} bytes")]
    Truncated { expected: u64, received: u64 },

    /// Writing the staging file failed.
    #[error("{op} failed for {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The store refused the new pair.
    #[error(transparent)]
    Install(#[from] IntegrityError),

    /// The blocking install task panicked or was cancelled.
    #[error("Install task failed: {0}")]
    Worker(String),
}

impl SyncError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        SyncError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}
