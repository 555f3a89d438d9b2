//! # ACL Sync Service
//!
//! Conditional fetch of the authorization list.
//!
//! ## Protocol
//!
//! 1. Present the stored digest (or `none`) in `X-Hash-SHA224`.
//! 2. Any status other than 200 fails the sync.
//! 3. If the response header echoes the presented digest, the stored list
//!    is current: the body is not read and nothing on disk changes.
//! 4. Otherwise stream the body to `<acl>.tmp` under the storage mount lock
//!    while hashing it, then hand the staged file to the store for an
//!    atomic install under the ACL lock. The install renames and fsyncs, so
//!    it runs on the blocking pool.
//!
//! A failure at any step abandons the staging file and leaves the installed
//! pair untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ac_01_acl_integrity::{AclIntegrityApi, IncrementalDigest, StorageMount};
use access_telemetry::{ACL_SYNC_OUTCOMES, BYTES_DOWNLOADED};
use async_trait::async_trait;
use shared_types::Digest;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use crate::domain::errors::SyncError;
use crate::domain::request::{FetchRequest, SyncOutcome, SyncRequest, SyncResult};
use crate::ports::inbound::{AclSyncApi, ProgressFn};
use crate::ports::outbound::{AclTransport, BodyStream};

/// The ACL sync client.
pub struct AclSyncClient {
    transport: Arc<dyn AclTransport>,
    store: Arc<dyn AclIntegrityApi>,
    mount: StorageMount,
    url: String,
}

impl AclSyncClient {
    /// Create a client fetching from `url`.
    pub fn new(
        transport: Arc<dyn AclTransport>,
        store: Arc<dyn AclIntegrityApi>,
        mount: StorageMount,
        url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            store,
            mount,
            url: url.into(),
        }
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn run_sync(&self, progress: &ProgressFn) -> Result<SyncResult, SyncError> {
        let request = SyncRequest {
            url: self.url.clone(),
            expected: self.store.expected_digest(),
        };
        debug!(
            url = %request.url,
            expected = request.expected.header_value(),
            "Starting ACL sync"
        );

        let response = self
            .transport
            .get(&FetchRequest {
                url: request.url.clone(),
                digest_header: Some(request.expected.header_value().to_string()),
            })
            .await?;

        let head = response.head;
        if head.status != 200 {
            return Err(SyncError::Status {
                status: head.status,
            });
        }

        let confirmed = head
            .advertised_digest
            .as_deref()
            .is_some_and(|advertised| request.expected.is_confirmed_by(advertised));
        if confirmed {
            return Ok(SyncResult {
                request,
                status: head.status,
                advertised_digest: head.advertised_digest,
                outcome: SyncOutcome::Unchanged {
                    confirmed_by_server: true,
                },
            });
        }

        let staged = self.store.paths().temp_blob();
        let _mount = self.mount.acquire().await;

        let (digest, bytes) =
            match stream_to_file(response.body, &staged, head.content_length, progress).await {
                Ok(done) => done,
                Err(e) => {
                    discard(&staged).await;
                    return Err(e);
                }
            };
        BYTES_DOWNLOADED.with_label_values(&["acl"]).inc_by(bytes as f64);

        if let Some(advertised) = &head.advertised_digest {
            if advertised != digest.as_str() {
                discard(&staged).await;
                return Err(SyncError::DigestMismatch {
                    advertised: advertised.clone(),
                    computed: digest,
                });
            }
        }

        if request.expected.digest() == Some(&digest) {
            discard(&staged).await;
            return Ok(SyncResult {
                request,
                status: head.status,
                advertised_digest: head.advertised_digest,
                outcome: SyncOutcome::Unchanged {
                    confirmed_by_server: false,
                },
            });
        }

        self.install(staged, digest.clone()).await?;

        Ok(SyncResult {
            request,
            status: head.status,
            advertised_digest: head.advertised_digest,
            outcome: SyncOutcome::Updated { digest, bytes },
        })
    }

    async fn install(&self, staged: PathBuf, digest: Digest) -> Result<(), SyncError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.install(&staged, &digest))
            .await
            .map_err(|e| SyncError::Worker(e.to_string()))??;
        Ok(())
    }

    async fn run_fetch(&self, url: &str, path: &Path) -> Result<u64, SyncError> {
        let response = self
            .transport
            .get(&FetchRequest {
                url: url.to_string(),
                digest_header: None,
            })
            .await?;

        if response.head.status != 200 {
            return Err(SyncError::Status {
                status: response.head.status,
            });
        }

        let staged = staging_path(path);
        let _mount = self.mount.acquire().await;

        let no_progress = |_: u64, _: Option<u64>| {};
        let bytes = match stream_to_file(
            response.body,
            &staged,
            response.head.content_length,
            &no_progress,
        )
        .await
        {
            Ok((_, bytes)) => bytes,
            Err(e) => {
                discard(&staged).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&staged, path).await {
            discard(&staged).await;
            return Err(SyncError::io("rename", path, e));
        }
        BYTES_DOWNLOADED.with_label_values(&["file"]).inc_by(bytes as f64);
        Ok(bytes)
    }
}

#[async_trait]
impl AclSyncApi for AclSyncClient {
    async fn sync(&self, progress: &ProgressFn) -> Result<SyncResult, SyncError> {
        match self.run_sync(progress).await {
            Ok(result) => {
                match &result.outcome {
                    SyncOutcome::Updated { digest, bytes } => {
                        ACL_SYNC_OUTCOMES.with_label_values(&["updated"]).inc();
                        info!(digest = %digest, bytes, "ACL updated");
                    }
                    SyncOutcome::Unchanged {
                        confirmed_by_server,
                    } => {
                        ACL_SYNC_OUTCOMES.with_label_values(&["unchanged"]).inc();
                        info!(confirmed_by_server, "ACL unchanged");
                    }
                }
                Ok(result)
            }
            Err(e) => {
                ACL_SYNC_OUTCOMES.with_label_values(&["failed"]).inc();
                error!(url = %self.url, error = %e, "ACL sync failed");
                Err(e)
            }
        }
    }

    async fn fetch_file(&self, url: &str, path: &Path) -> Result<u64, SyncError> {
        match self.run_fetch(url, path).await {
            Ok(bytes) => {
                info!(url, path = %path.display(), bytes, "File downloaded");
                Ok(bytes)
            }
            Err(e) => {
                error!(url, path = %path.display(), error = %e, "File download failed");
                Err(e)
            }
        }
    }
}

/// Write the body to `path`, hashing as it goes.
async fn stream_to_file(
    mut body: Box<dyn BodyStream>,
    path: &Path,
    content_length: Option<u64>,
    progress: &ProgressFn,
) -> Result<(Digest, u64), SyncError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| SyncError::io("create", path, e))?;
    let mut digest = IncrementalDigest::new();

    while let Some(chunk) = body.next_chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(|e| SyncError::io("write", path, e))?;
        digest.update(&chunk);
        progress(digest.bytes(), content_length);
    }

    file.flush()
        .await
        .map_err(|e| SyncError::io("flush", path, e))?;
    file.sync_all()
        .await
        .map_err(|e| SyncError::io("sync", path, e))?;

    let received = digest.bytes();
    if let Some(expected) = content_length {
        if received != expected {
            return Err(SyncError::Truncated { expected, received });
        }
    }

    Ok((digest.finalize(), received))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(ac_01_acl_integrity::domain::paths::TEMP_SUFFIX);
    PathBuf::from(name)
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove staging file");
        }
    }
}
