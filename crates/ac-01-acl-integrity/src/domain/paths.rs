//! Locations of the stored ACL pair.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix of the sibling file a new blob or digest is staged in.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Paths of the ACL blob and its digest file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclPaths {
    /// The authorization list itself.
    pub blob: PathBuf,
    /// Hex digest of the blob.
    pub digest: PathBuf,
}

impl AclPaths {
    /// Create a path pair.
    pub fn new(blob: impl Into<PathBuf>, digest: impl Into<PathBuf>) -> Self {
        Self {
            blob: blob.into(),
            digest: digest.into(),
        }
    }

    /// Standard pair inside `dir`: `acl.csv` and `acl.sha`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join("acl.csv"), dir.join("acl.sha"))
    }

    /// Staging file for a downloaded blob.
    pub fn temp_blob(&self) -> PathBuf {
        with_suffix(&self.blob)
    }

    /// Staging file for a digest rewrite.
    pub fn temp_digest(&self) -> PathBuf {
        with_suffix(&self.digest)
    }
}

impl Default for AclPaths {
    fn default() -> Self {
        Self::in_dir("/config")
    }
}

fn with_suffix(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let paths = AclPaths::default();
        assert_eq!(paths.blob, PathBuf::from("/config/acl.csv"));
        assert_eq!(paths.digest, PathBuf::from("/config/acl.sha"));
    }

    #[test]
    fn test_temp_paths_are_siblings() {
        let paths = AclPaths::in_dir("/data");
        assert_eq!(paths.temp_blob(), PathBuf::from("/data/acl.csv.tmp"));
        assert_eq!(paths.temp_digest(), PathBuf::from("/data/acl.sha.tmp"));
    }
}
