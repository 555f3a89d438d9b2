//! # Inbound Ports (Driving Ports)
//!
//! Operations on the stored ACL pair. Every operation serializes on the
//! single ACL lock; none of them hold it across network I/O.

use crate::domain::errors::IntegrityError;
use crate::domain::paths::AclPaths;
use shared_types::{Digest, ExpectedDigest};
use std::path::Path;

/// Primary API of the ACL integrity unit.
pub trait AclIntegrityApi: Send + Sync {
    /// Decide whether the stored ACL may be trusted.
    ///
    /// Returns the verified digest. On any failure both the blob and the
    /// digest file are deleted before the error is returned.
    fn validate(&self) -> Result<Digest, IntegrityError>;

    /// The digest a conditional fetch should present.
    ///
    /// Absent or unreadable digests yield [`ExpectedDigest::None`].
    fn expected_digest(&self) -> ExpectedDigest;

    /// Replace the stored blob with `staged` and record `digest`.
    ///
    /// Delete-then-rename of the blob, followed by an atomic rewrite of the
    /// digest file. If any step fails the pair is purged.
    fn install(&self, staged: &Path, digest: &Digest) -> Result<(), IntegrityError>;

    /// Delete both artifacts. Missing files are not an error.
    fn purge(&self) -> Result<(), IntegrityError>;

    /// Read the stored blob, if any.
    fn read_acl(&self) -> Result<Option<Vec<u8>>, IntegrityError>;

    /// Paths of the stored pair.
    fn paths(&self) -> &AclPaths;
}
