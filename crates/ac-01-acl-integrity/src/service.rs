//! # ACL Store Service
//!
//! Owns the stored ACL pair and the lock that guards it.
//!
//! ## Invariant
//!
//! If the blob exists, the digest file exists and matches it. Any observed
//! violation deletes both files: the controller falls back to "no cached
//! ACL", never to "stale but present".

use crate::domain::digest::{digest_reader, parse_digest_file};
use crate::domain::errors::IntegrityError;
use crate::domain::paths::AclPaths;
use crate::ports::inbound::AclIntegrityApi;
use access_telemetry::ACL_INTEGRITY_FAILURES;
use parking_lot::{Mutex, MutexGuard};
use shared_types::{Digest, ExpectedDigest};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The persisted ACL blob plus its expected digest.
///
/// Cloning shares the same lock; every clone refers to the same pair.
#[derive(Debug, Clone)]
pub struct AclStore {
    paths: AclPaths,
    lock: Arc<Mutex<()>>,
}

impl AclStore {
    /// Create a store over `paths`. Nothing is touched on disk.
    pub fn new(paths: AclPaths) -> Self {
        Self {
            paths,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Hold the ACL lock for a caller-defined read sequence.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock()
    }

    /// Digest of the current blob without comparing it to anything.
    pub fn compute_digest(&self) -> Result<Digest, IntegrityError> {
        let _guard = self.lock.lock();
        self.compute_digest_locked()
    }

    fn compute_digest_locked(&self) -> Result<Digest, IntegrityError> {
        let file = File::open(&self.paths.blob)
            .map_err(|e| IntegrityError::io("open", &self.paths.blob, e))?;
        digest_reader(file).map_err(|e| IntegrityError::io("read", &self.paths.blob, e))
    }

    fn load_digest_locked(&self) -> Result<Digest, IntegrityError> {
        let raw = match fs::read(&self.paths.digest) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(IntegrityError::DigestMissing {
                    path: self.paths.digest.clone(),
                })
            }
            Err(e) => return Err(IntegrityError::io("read", &self.paths.digest, e)),
        };
        parse_digest_file(&raw).map_err(|reason| IntegrityError::DigestMalformed {
            path: self.paths.digest.clone(),
            reason,
        })
    }

    fn validate_locked(&self) -> Result<Digest, IntegrityError> {
        let expected = self.load_digest_locked()?;
        let actual = self.compute_digest_locked()?;
        if expected != actual {
            return Err(IntegrityError::Mismatch { expected, actual });
        }
        Ok(actual)
    }

    fn install_locked(&self, staged: &Path, digest: &Digest) -> Result<(), IntegrityError> {
        remove_if_present(&self.paths.blob)?;
        fs::rename(staged, &self.paths.blob)
            .map_err(|e| IntegrityError::io("rename", &self.paths.blob, e))?;
        self.write_digest_locked(digest)
    }

    fn write_digest_locked(&self, digest: &Digest) -> Result<(), IntegrityError> {
        let temp = self.paths.temp_digest();
        let result = (|| -> io::Result<()> {
            let mut file = File::create(&temp)?;
            file.write_all(digest.as_str().as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp, &self.paths.digest)
        })();
        result.map_err(|e| {
            let _ = fs::remove_file(&temp);
            IntegrityError::io("write", &self.paths.digest, e)
        })
    }

    fn purge_locked(&self) -> Result<(), IntegrityError> {
        let blob = remove_if_present(&self.paths.blob);
        let digest = remove_if_present(&self.paths.digest);
        blob.and(digest)
    }
}

impl AclIntegrityApi for AclStore {
    fn validate(&self) -> Result<Digest, IntegrityError> {
        let _guard = self.lock.lock();

        match self.validate_locked() {
            Ok(digest) => {
                info!(digest = %digest, "ACL digest verified");
                Ok(digest)
            }
            Err(e) => {
                ACL_INTEGRITY_FAILURES
                    .with_label_values(&[e.reason()])
                    .inc();
                if e.is_not_provisioned() {
                    warn!(path = %self.paths.digest.display(), "ACL not provisioned");
                } else {
                    warn!(error = %e, "ACL failed integrity check, purging");
                }
                if let Err(purge_err) = self.purge_locked() {
                    warn!(error = %purge_err, "Failed to purge untrusted ACL");
                }
                Err(e)
            }
        }
    }

    fn expected_digest(&self) -> ExpectedDigest {
        let _guard = self.lock.lock();
        match self.load_digest_locked() {
            Ok(digest) => ExpectedDigest::Known(digest),
            Err(IntegrityError::DigestMissing { .. }) => ExpectedDigest::None,
            Err(e) => {
                warn!(error = %e, "Stored ACL digest unusable, requesting full download");
                ExpectedDigest::None
            }
        }
    }

    fn install(&self, staged: &Path, digest: &Digest) -> Result<(), IntegrityError> {
        let _guard = self.lock.lock();

        match self.install_locked(staged, digest) {
            Ok(()) => {
                info!(digest = %digest, "ACL installed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "ACL install failed, purging");
                let _ = fs::remove_file(staged);
                if let Err(purge_err) = self.purge_locked() {
                    warn!(error = %purge_err, "Failed to purge partial ACL install");
                }
                Err(e)
            }
        }
    }

    fn purge(&self) -> Result<(), IntegrityError> {
        let _guard = self.lock.lock();
        debug!("Purging stored ACL");
        self.purge_locked()
    }

    fn read_acl(&self) -> Result<Option<Vec<u8>>, IntegrityError> {
        let _guard = self.lock.lock();
        match fs::read(&self.paths.blob) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(IntegrityError::io("read", &self.paths.blob, e)),
        }
    }

    fn paths(&self) -> &AclPaths {
        &self.paths
    }
}

fn remove_if_present(path: &Path) -> Result<(), IntegrityError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(IntegrityError::io("remove", path, e)),
    }
}
