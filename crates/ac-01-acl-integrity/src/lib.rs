//! # ACL Integrity (ac-01)
//!
//! Decides whether the persisted access-control list may be trusted and
//! owns every mutation of it.
//!
//! ## Stored Pair
//!
//! ```text
//! /config/acl.csv   opaque blob, read by the credential lookup
//! /config/acl.sha   56 hex chars, SHA-224 of acl.csv
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Paired | A blob never exists without a matching digest |
//! | 2 | Fail Closed | Any mismatch or read error deletes both files |
//! | 3 | Serialized | Validate, install and purge share one exclusive lock |
//! | 4 | Bounded Memory | Hashing streams the blob in 256-byte chunks |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - digest computation, digest-file parsing, paths, errors
//! - `ports/` - `AclIntegrityApi`
//! - `service.rs` - `AclStore`, the implementation
//! - `adapters/` - process lock and storage mount lock

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::lock::{LockError, StorageLock};
pub use adapters::mount::StorageMount;
pub use domain::digest::{digest_reader, parse_digest_file, IncrementalDigest, CHUNK_SIZE};
pub use domain::errors::IntegrityError;
pub use domain::paths::AclPaths;
pub use ports::inbound::AclIntegrityApi;
pub use service::AclStore;
