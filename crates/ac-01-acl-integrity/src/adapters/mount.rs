//! Exclusive access to the persistent storage mount.
//!
//! The mount is shared with collaborators outside the ACL pair (the
//! credential database, downloaded files). Writers hold this lock while
//! they stream data onto the mount; it is separate from the ACL lock so a
//! long download never blocks credential lookups.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Handle to the storage mount. Clones share one lock.
#[derive(Debug, Clone)]
pub struct StorageMount {
    root: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl StorageMount {
    /// Create a handle for the mount rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Wait for exclusive access.
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    /// Take exclusive access if nobody holds it.
    pub fn try_acquire(&self) -> Option<MutexGuard<'_, ()>> {
        self.lock.try_lock().ok()
    }

    /// Mount point.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mount_is_exclusive() {
        let mount = StorageMount::new("/config");
        let other = mount.clone();

        let guard = mount.acquire().await;
        assert!(other.try_acquire().is_none());

        drop(guard);
        assert!(other.try_acquire().is_some());
        assert_eq!(other.root(), Path::new("/config"));
    }
}
