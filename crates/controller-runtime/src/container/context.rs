//! # Application Context
//!
//! Shared handles built once at startup and passed to every unit:
//! the ACL store, the storage mount, TLS material, the quiescence registry
//! and the process lock on the storage directory.
//!
//! ## Thread Safety
//!
//! - Everything is behind `Arc` or cheaply cloneable
//! - TLS material is immutable after load

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ac_01_acl_integrity::{AclStore, LockError, StorageLock, StorageMount};
use ac_02_acl_sync::ClientTls;
use access_telemetry::MetricsHandle;
use shared_bus::QuiescenceRegistry;
use thiserror::Error;
use tracing::info;

use crate::container::config::{ControllerConfig, TlsConfig};

/// Startup failures.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Storage directory is locked: {0}")]
    Lock(#[from] LockError),

    #[error("Failed to read TLS file {path}: {source}")]
    TlsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Handles shared by the units.
pub struct AppContext {
    pub config: ControllerConfig,
    pub store: Arc<AclStore>,
    pub mount: StorageMount,
    pub tls: ClientTls,
    pub registry: Arc<QuiescenceRegistry>,
    /// `None` when metrics were not registered (tests, embedding).
    pub metrics: Option<MetricsHandle>,
    /// Released on drop.
    _lock: StorageLock,
}

impl AppContext {
    /// Take the storage lock, load TLS material and build the store.
    pub fn new(
        config: ControllerConfig,
        metrics: Option<MetricsHandle>,
    ) -> Result<Self, ContextError> {
        let lock = StorageLock::acquire(&config.acl.storage_dir)?;
        info!(path = %lock.path().display(), pid = lock.pid(), "Storage lock acquired");

        let tls = load_tls(&config.tls)?;
        let store = Arc::new(AclStore::new(config.acl.paths()));
        let mount = StorageMount::new(config.acl.storage_dir.clone());

        Ok(Self {
            config,
            store,
            mount,
            tls,
            registry: Arc::new(QuiescenceRegistry::new()),
            metrics,
            _lock: lock,
        })
    }
}

/// Read the configured PEM files. The client identity is the certificate
/// followed by its key.
pub fn load_tls(config: &TlsConfig) -> Result<ClientTls, ContextError> {
    let identity_pem = match (&config.client_cert, &config.client_key) {
        (Some(cert), Some(key)) => {
            let mut pem = read_pem(cert)?;
            if !pem.ends_with(b"\n") {
                pem.push(b'\n');
            }
            pem.extend(read_pem(key)?);
            Some(Arc::from(pem))
        }
        _ => None,
    };
    let ca_pem = match &config.ca_cert {
        Some(path) => Some(Arc::from(read_pem(path)?)),
        None => None,
    };

    info!(
        client_identity = identity_pem.is_some(),
        custom_ca = ca_pem.is_some(),
        "TLS material loaded"
    );
    Ok(ClientTls {
        identity_pem,
        ca_pem,
    })
}

fn read_pem(path: &Path) -> Result<Vec<u8>, ContextError> {
    fs::read(path).map_err(|source| ContextError::TlsRead {
        path: path.to_path_buf(),
        source,
    })
}
