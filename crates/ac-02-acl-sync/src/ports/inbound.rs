//! # Inbound Ports (Driving Ports)

use crate::domain::errors::SyncError;
use crate::domain::request::SyncResult;
use async_trait::async_trait;
use std::path::Path;

/// Progress callback: `(bytes_received, content_length)`.
///
/// `content_length` is `None` for chunked transfers. Progress drives status
/// display only and has no effect on the result.
pub type ProgressFn = dyn Fn(u64, Option<u64>) + Send + Sync;

/// API of the ACL sync unit.
#[async_trait]
pub trait AclSyncApi: Send + Sync {
    /// Run one conditional fetch and install the result if it changed.
    async fn sync(&self, progress: &ProgressFn) -> Result<SyncResult, SyncError>;

    /// Download `url` to `path`. Returns the number of bytes written.
    async fn fetch_file(&self, url: &str, path: &Path) -> Result<u64, SyncError>;
}
