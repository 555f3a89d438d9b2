//! # ACL Lifecycle
//!
//! ac-01 (integrity) and ac-02 (sync) against a scripted authority server:
//!
//! 1. **First boot**: no digest stored, sync sends `none`, body is installed
//! 2. **Current**: the server confirms the stored digest, nothing is written
//! 3. **Tamper**: a modified blob fails closed and both files are removed
//! 4. **Interrupted transfer**: the installed pair is left byte-for-byte intact

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use ac_01_acl_integrity::{digest_reader, AclIntegrityApi, AclPaths, AclStore, StorageMount};
    use ac_02_acl_sync::{AclSyncApi, AclSyncClient, SyncError, SyncOutcome};
    use shared_types::{Digest, ExpectedDigest, NO_DIGEST};
    use tempfile::TempDir;

    use crate::fixtures::{Reply, ScriptedServer};

    const ACL_V1: &[u8] = b"tag,name,allowed\n\
        0001234567,Ada Lovelace,allowed\n\
        0000000099,Grace Hopper,allowed\n";

    const ACL_V2: &[u8] = b"tag,name,allowed\n\
        0001234567,Ada Lovelace,denied\n\
        0000000099,Grace Hopper,allowed\n\
        0000000100,Edsger Dijkstra,allowed\n";

    fn digest_of(body: &[u8]) -> Digest {
        digest_reader(body).unwrap()
    }

    struct Node {
        _dir: TempDir,
        paths: AclPaths,
        store: Arc<AclStore>,
        server: Arc<ScriptedServer>,
        client: AclSyncClient,
    }

    fn node(replies: Vec<Reply>) -> Node {
        let dir = tempfile::tempdir().unwrap();
        let paths = AclPaths::in_dir(dir.path());
        let store = Arc::new(AclStore::new(paths.clone()));
        let server = ScriptedServer::new(replies);
        let client = AclSyncClient::new(
            server.clone(),
            store.clone(),
            StorageMount::new(dir.path()),
            "https://auth.example/api/v0/resources/frontdoor/acl",
        );
        Node {
            _dir: dir,
            paths,
            store,
            server,
            client,
        }
    }

    async fn sync(node: &Node) -> Result<SyncOutcome, SyncError> {
        let progress = |_: u64, _: Option<u64>| {};
        node.client.sync(&progress).await.map(|r| r.outcome)
    }

    /// Install `body` through a full sync.
    async fn provision(node: &Node, body: &[u8]) -> Digest {
        let digest = digest_of(body);
        node.server.push(Reply::ok(body, digest.as_str()));
        sync(node).await.unwrap();
        digest
    }

    // =========================================================================
    // FIRST BOOT
    // =========================================================================

    #[tokio::test]
    async fn test_first_boot_installs_acl_from_server() {
        let digest = digest_of(ACL_V1);
        let node = node(vec![Reply::ok(ACL_V1, digest.as_str())]);

        let err = node.store.validate().unwrap_err();
        assert!(err.is_not_provisioned());
        assert_eq!(node.store.expected_digest(), ExpectedDigest::None);

        let outcome = sync(&node).await.unwrap();
        assert_eq!(
            outcome,
            SyncOutcome::Updated {
                digest: digest.clone(),
                bytes: ACL_V1.len() as u64,
            }
        );
        assert_eq!(node.server.last_digest_header().as_deref(), Some(NO_DIGEST));

        assert_eq!(node.store.validate().unwrap(), digest);
        assert_eq!(node.store.read_acl().unwrap().as_deref(), Some(ACL_V1));
    }

    #[tokio::test]
    async fn test_new_version_replaces_installed_acl() {
        let node = node(vec![]);
        let v1 = provision(&node, ACL_V1).await;
        let v2 = provision(&node, ACL_V2).await;

        let headers: Vec<_> = node
            .server
            .requests()
            .into_iter()
            .map(|r| r.digest_header)
            .collect();
        assert_eq!(
            headers,
            vec![Some(NO_DIGEST.to_string()), Some(v1.as_str().to_string())]
        );
        assert_eq!(node.store.validate().unwrap(), v2);
        assert_eq!(fs::read(&node.paths.blob).unwrap(), ACL_V2);
    }

    // =========================================================================
    // CONDITIONAL FETCH
    // =========================================================================

    #[tokio::test]
    async fn test_current_digest_performs_no_writes() {
        let node = node(vec![]);
        let digest = provision(&node, ACL_V1).await;
        let blob_modified = fs::metadata(&node.paths.blob).unwrap().modified().unwrap();
        let digest_modified = fs::metadata(&node.paths.digest).unwrap().modified().unwrap();

        node.server.push(Reply::current(digest.as_str()));
        let outcome = sync(&node).await.unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::Unchanged {
                confirmed_by_server: true
            }
        );
        assert_eq!(
            node.server.last_digest_header().as_deref(),
            Some(digest.as_str())
        );
        assert_eq!(
            fs::metadata(&node.paths.blob).unwrap().modified().unwrap(),
            blob_modified
        );
        assert_eq!(
            fs::metadata(&node.paths.digest).unwrap().modified().unwrap(),
            digest_modified
        );
        assert!(!node.paths.temp_blob().exists());
    }

    // =========================================================================
    // FAIL CLOSED
    // =========================================================================

    #[tokio::test]
    async fn test_tampered_blob_is_purged() {
        let node = node(vec![]);
        provision(&node, ACL_V1).await;

        let mut blob = fs::read(&node.paths.blob).unwrap();
        blob[20] ^= 0x01;
        fs::write(&node.paths.blob, &blob).unwrap();

        assert!(node.store.validate().is_err());
        assert!(!node.paths.blob.exists());
        assert!(!node.paths.digest.exists());
        assert_eq!(node.store.read_acl().unwrap(), None);
        assert_eq!(node.store.expected_digest(), ExpectedDigest::None);
    }

    #[tokio::test]
    async fn test_interrupted_transfer_keeps_installed_pair() {
        let node = node(vec![]);
        let v1 = provision(&node, ACL_V1).await;
        let digest_file = fs::read(&node.paths.digest).unwrap();

        let v2 = digest_of(ACL_V2);
        node.server
            .push(Reply::ok(ACL_V2, v2.as_str()).interrupted());
        assert!(matches!(sync(&node).await, Err(SyncError::Transport(_))));

        assert_eq!(fs::read(&node.paths.blob).unwrap(), ACL_V1);
        assert_eq!(fs::read(&node.paths.digest).unwrap(), digest_file);
        assert_eq!(node.store.validate().unwrap(), v1);
    }

    #[tokio::test]
    async fn test_server_error_is_failed_sync() {
        let node = node(vec![]);
        let v1 = provision(&node, ACL_V1).await;

        node.server.push(Reply::status(503));
        assert!(matches!(
            sync(&node).await,
            Err(SyncError::Status { status: 503 })
        ));
        assert_eq!(node.store.validate().unwrap(), v1);
    }

    #[tokio::test]
    async fn test_body_not_matching_advertised_digest_is_rejected() {
        let node = node(vec![]);
        let v1 = provision(&node, ACL_V1).await;

        // Header claims v1 content is not current, but the body is corrupt.
        node.server.push(Reply::ok(ACL_V2, digest_of(b"other").as_str()));
        assert!(matches!(
            sync(&node).await,
            Err(SyncError::DigestMismatch { .. })
        ));
        assert_eq!(node.store.validate().unwrap(), v1);
    }
}
