//! # Controller Runtime
//!
//! Process wiring for the access controller. The binary in `main.rs` is a
//! thin shell over [`ControllerRuntime`].
//!
//! ## Units
//!
//! ```text
//!                 Command mailbox
//!  Controller ───────────────────────→ Network Orchestrator
//!   (ac-04)   ←─────────────────────── (ac-03)  ──→ ACL Sync (ac-02)
//!                 Event mailbox                         │
//!       │                                               ↓
//!       └──── credential lookup ──────────────→ ACL Integrity (ac-01)
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Acquire the process lock on the storage directory
//! 2. Load TLS material
//! 3. Validate the stored ACL (a failure purges it; not fatal)
//! 4. Open both mailboxes, degrading to one slot on a bad capacity
//! 5. Spawn the network and controller units
//!
//! Shutdown is a `watch` signal; both units finish their current iteration
//! and exit.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod container;

use std::sync::Arc;
use std::time::Duration;

use ac_01_acl_integrity::AclIntegrityApi;
use ac_02_acl_sync::{AclSyncClient, BasicAuth, HttpConfig, HttpTransport};
use ac_03_network::{FirmwareUpdater, LinkPort, NetworkOrchestrator, NetworkPorts, TelemetrySink};
use ac_04_controller::{
    AclCredentials, Annunciator, Controller, ControllerPorts, ControllerTask, LockActuator,
    Platform, QuiescentPlatform,
};
use access_telemetry::MetricsHandle;
use anyhow::{Context, Result};
use shared_types::{Command, Event};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::adapters::{
    HostLink, HostPlatform, LogTelemetrySink, LoggingAnnunciator, LoggingLock, UnsupportedUpdater,
};
use crate::container::{AppContext, ControllerConfig};

/// How long shutdown waits for a unit before aborting it.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Board-specific collaborators.
#[derive(Clone)]
pub struct Collaborators {
    pub lock: Arc<dyn LockActuator>,
    pub annunciator: Arc<dyn Annunciator>,
    pub platform: Arc<dyn Platform>,
    pub link: Arc<dyn LinkPort>,
    pub sink: Arc<dyn TelemetrySink>,
    pub updater: Arc<dyn FirmwareUpdater>,
}

impl Collaborators {
    /// Logging stand-ins for running on a host.
    pub fn host() -> Self {
        Self {
            lock: Arc::new(LoggingLock::default()),
            annunciator: Arc::new(LoggingAnnunciator),
            platform: Arc::new(HostPlatform),
            link: Arc::new(HostLink::default()),
            sink: Arc::new(LogTelemetrySink),
            updater: Arc::new(UnsupportedUpdater),
        }
    }
}

/// The running access controller.
pub struct ControllerRuntime {
    context: AppContext,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    units: Vec<(&'static str, JoinHandle<()>)>,
}

impl ControllerRuntime {
    /// Take the storage lock and build the shared context.
    pub fn new(config: ControllerConfig, metrics: Option<MetricsHandle>) -> Result<Self> {
        let context =
            AppContext::new(config, metrics).context("Failed to build application context")?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            context,
            shutdown_tx,
            shutdown_rx,
            units: Vec::new(),
        })
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Validate the ACL and spawn both units.
    pub fn start(&mut self, collaborators: Collaborators) -> Result<()> {
        let config = &self.context.config;
        info!(
            node = %config.network.node_id,
            storage = %config.acl.storage_dir.display(),
            metrics = self.context.metrics.is_some(),
            "Starting access controller"
        );

        self.check_acl();

        let send_timeout = config.mailbox.send_timeout();
        let (events_tx, events_rx) = shared_bus::open_or_degraded::<Event>(
            "controller",
            config.mailbox.controller_depth,
            send_timeout,
        );
        let (commands_tx, commands_rx) = shared_bus::open_or_degraded::<Command>(
            "network",
            config.mailbox.network_depth,
            send_timeout,
        );

        let auth = (!config.sync.api_user.is_empty()).then(|| BasicAuth {
            user: config.sync.api_user.clone(),
            password: config.sync.api_password.clone(),
        });
        let transport = HttpTransport::new(&HttpConfig {
            connect_timeout: Duration::from_secs(config.sync.connect_timeout_secs),
            request_timeout: Duration::from_secs(config.sync.request_timeout_secs),
            auth,
            tls: self.context.tls.clone(),
        })
        .context("Failed to build HTTPS client")?;

        let store: Arc<dyn AclIntegrityApi> = self.context.store.clone();
        let sync = AclSyncClient::new(
            Arc::new(transport),
            store.clone(),
            self.context.mount.clone(),
            config.sync.acl_url(),
        );

        let network = NetworkOrchestrator::new(
            NetworkPorts {
                link: collaborators.link,
                sink: collaborators.sink,
                updater: collaborators.updater,
                sync: Arc::new(sync),
            },
            config.network_settings(),
            events_tx.clone(),
            commands_tx.clone(),
            self.context.registry.register("network"),
        );

        let controller = ControllerTask::new(
            Controller::new(config.timing.controller_timings()),
            ControllerPorts {
                lock: collaborators.lock,
                annunciator: collaborators.annunciator,
                credentials: Arc::new(AclCredentials::new(store)),
                platform: Arc::new(QuiescentPlatform::new(
                    collaborators.platform,
                    self.context.registry.clone(),
                )),
            },
            events_tx,
            commands_tx,
            config.timing.poll_interval(),
        );

        self.units.push((
            "network",
            tokio::spawn(network.run(commands_rx, self.shutdown_rx.clone())),
        ));
        self.units.push((
            "controller",
            tokio::spawn(controller.run(events_rx, self.shutdown_rx.clone())),
        ));

        info!("Access controller running");
        Ok(())
    }

    fn check_acl(&self) {
        match self.context.store.validate() {
            Ok(digest) => info!(digest = %digest.as_str(), "Stored ACL is valid"),
            Err(e) if e.is_not_provisioned() => {
                warn!("No ACL provisioned, every tag is denied until the first sync")
            }
            Err(e) => error!(error = %e, "Stored ACL rejected and purged"),
        }
    }

    /// Current counters in Prometheus text format, when metrics are
    /// registered.
    pub fn metrics_snapshot(&self) -> Option<String> {
        self.context.metrics?;
        match access_telemetry::encode_metrics() {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "Failed to encode metrics");
                None
            }
        }
    }

    /// Signal shutdown and wait for both units.
    pub async fn shutdown(mut self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        for (name, mut handle) in self.units.drain(..) {
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await {
                Ok(Ok(())) => info!(unit = name, "Unit stopped"),
                Ok(Err(e)) => error!(unit = name, error = %e, "Unit failed"),
                Err(_) => {
                    warn!(unit = name, "Unit did not stop in time, aborting");
                    handle.abort();
                }
            }
        }

        if let Some(text) = self.metrics_snapshot() {
            debug!(metrics = %text, "Final metrics");
        }
        info!("Shutdown complete");
    }
}
