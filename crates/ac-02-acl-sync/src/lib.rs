//! # ACL Sync (ac-02)
//!
//! Keeps the stored access-control list current against the authority
//! server with as little transfer as possible.
//!
//! ## Flow
//!
//! ```text
//! AclStore ──expected digest──► AclSyncClient ──GET + X-Hash-SHA224──► server
//!    ▲                               │
//!    └──── install(staged, digest) ◄─┘  (only on 200 with a new body)
//! ```
//!
//! ## Guarantees
//!
//! | ID | Guarantee | Description |
//! |----|-----------|-------------|
//! | 1 | Idempotent | A confirmed digest performs zero writes |
//! | 2 | Atomic | A failed transfer leaves the installed pair byte-for-byte intact |
//! | 3 | Verified | A body that hashes differently from the advertised digest is discarded |
//! | 4 | No Retry | Retry policy belongs to the caller; each attempt is fail-safe |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - request/result values and errors
//! - `ports/` - `AclSyncApi` (inbound), `AclTransport` (outbound)
//! - `service.rs` - `AclSyncClient`
//! - `adapters/` - reqwest transport

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::http::{BasicAuth, ClientTls, HttpConfig, HttpTransport};
pub use domain::errors::{SyncError, TransportError};
pub use domain::request::{
    acl_url, FetchRequest, ResponseHead, SyncOutcome, SyncRequest, SyncResult, DIGEST_HEADER,
};
pub use ports::inbound::{AclSyncApi, ProgressFn};
pub use ports::outbound::{AclTransport, BodyStream, FetchResponse};
pub use service::AclSyncClient;
