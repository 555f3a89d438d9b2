//! # Network Orchestrator
//!
//! Single execution unit owning the link lifecycle, ACL sync triggering and
//! outbound telemetry. Commands arrive through its mailbox; follow-up work
//! (`Connect` → `Init` → `DownloadAcl`) is queued back into the same
//! mailbox so it interleaves fairly with commands from other units.
//!
//! Nothing here is fatal. Link, sync and publish failures are logged and
//! the loop keeps polling. Retry of a failed sync is the periodic refresh.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ac_02_acl_sync::{AclSyncApi, SyncOutcome};
use access_telemetry::{NET_CONNECTED, TELEMETRY_FAILURES};
use shared_bus::{ActivityHandle, MailboxReceiver, MailboxSender};
use shared_types::{Command, Event};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use crate::domain::settings::NetworkSettings;
use crate::domain::telemetry::{Report, TopicBuilder};
use crate::ports::outbound::{FirmwareUpdater, LinkPort, TelemetrySink};

/// Upper bound on one publish; a stalled broker must not stall the loop.
const PUBLISH_TIMEOUT: Duration = Duration::from_secs(1);

/// External collaborators driven by the orchestrator.
#[derive(Clone)]
pub struct NetworkPorts {
    pub link: Arc<dyn LinkPort>,
    pub sink: Arc<dyn TelemetrySink>,
    pub updater: Arc<dyn FirmwareUpdater>,
    pub sync: Arc<dyn AclSyncApi>,
}

/// The network execution unit.
pub struct NetworkOrchestrator {
    ports: NetworkPorts,
    settings: NetworkSettings,
    topics: TopicBuilder,
    /// Controller mailbox.
    events: MailboxSender<Event>,
    /// Own mailbox, for follow-up commands.
    commands: MailboxSender<Command>,
    activity: ActivityHandle,
    connected: bool,
    next_acl_sync: Option<Instant>,
    next_wifi_report: Option<Instant>,
}

impl NetworkOrchestrator {
    pub fn new(
        ports: NetworkPorts,
        settings: NetworkSettings,
        events: MailboxSender<Event>,
        commands: MailboxSender<Command>,
        activity: ActivityHandle,
    ) -> Self {
        let topics = TopicBuilder::new(settings.topic_base.clone(), settings.node_id.clone());
        Self {
            ports,
            settings,
            topics,
            events,
            commands,
            activity,
            connected: false,
            next_acl_sync: None,
            next_wifi_report: None,
        }
    }

    /// Whether the link is currently up.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Poll the mailbox until shutdown is signalled.
    pub async fn run(
        mut self,
        mut mailbox: MailboxReceiver<Command>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            node = %self.settings.node_id,
            mailbox = mailbox.name(),
            "Network orchestrator started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                command = mailbox.recv_timeout(self.settings.poll_interval) => {
                    if let Some(command) = command {
                        self.handle(command).await;
                    }
                }
            }

            self.tick(Instant::now()).await;
        }

        info!("Network orchestrator stopped");
    }

    /// Handle one command.
    pub async fn handle(&mut self, command: Command) {
        debug!(command = command.name(), "Handling network command");

        match command {
            Command::Connect => self.connect().await,
            Command::Disconnect => self.disconnect().await,
            Command::Init => {
                self.commands.post(Command::DownloadAcl).await;
            }
            Command::DownloadAcl => self.download_acl().await,
            Command::SendWifiStrength => self.report_wifi().await,
            Command::OtaUpdate => self.firmware_update().await,
            Command::FetchFile { url, path } => self.fetch_file(&url, Path::new(&path)).await,
            other => match Report::from_command(&other) {
                Some(report) => self.publish(report).await,
                None => warn!(command = other.name(), "Unhandled network command"),
            },
        }
    }

    /// Periodic duties, run once per loop iteration.
    pub async fn tick(&mut self, now: Instant) {
        if !self.connected {
            return;
        }

        if self.next_wifi_report.is_some_and(|due| due <= now) {
            self.next_wifi_report = Some(now + self.settings.wifi_report_interval);
            self.report_wifi().await;
        }

        if self.next_acl_sync.is_some_and(|due| due <= now) {
            debug!("Periodic ACL refresh due");
            self.download_acl().await;
        }
    }

    async fn connect(&mut self) {
        if self.connected {
            debug!("Connect requested while already connected");
            return;
        }

        match self.ports.link.connect().await {
            Ok(()) => {
                info!("Network connected");
                self.connected = true;
                NET_CONNECTED.set(1);

                let now = Instant::now();
                self.next_wifi_report = Some(now);
                self.next_acl_sync = Some(now + self.settings.acl_refresh_interval);

                self.events.post(Event::NetConnected).await;
                self.commands.post(Command::Init).await;
            }
            Err(e) => error!(error = %e, "Network connect failed"),
        }
    }

    async fn disconnect(&mut self) {
        if !self.connected {
            debug!("Disconnect requested while not connected");
            return;
        }

        // A failed teardown still counts as down so the sleep path can
        // proceed.
        if let Err(e) = self.ports.link.disconnect().await {
            warn!(error = %e, "Network disconnect reported an error");
        }

        info!("Network disconnected");
        self.connected = false;
        self.next_acl_sync = None;
        self.next_wifi_report = None;
        NET_CONNECTED.set(0);

        self.events.post(Event::NetDisconnected).await;
    }

    async fn download_acl(&mut self) {
        let activity = self.activity.clone();
        let _busy = activity.busy();

        let started = Instant::now();
        let progress = |received: u64, total: Option<u64>| {
            trace!(received, total = ?total, "ACL download progress");
        };
        let result = self.ports.sync.sync(&progress).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        self.next_acl_sync = Some(Instant::now() + self.settings.acl_refresh_interval);

        let follow_up = match result {
            Ok(result) => {
                match &result.outcome {
                    SyncOutcome::Updated { digest, bytes } => {
                        info!(digest = %digest, bytes, elapsed_ms, "ACL download OK")
                    }
                    SyncOutcome::Unchanged {
                        confirmed_by_server,
                    } => info!(confirmed_by_server, elapsed_ms, "ACL already current"),
                }
                Command::SendAclUpdated
            }
            Err(e) => {
                error!(error = %e, elapsed_ms, "ACL download failed");
                Command::SendAclFailed
            }
        };

        self.commands.post(follow_up).await;
    }

    async fn report_wifi(&self) {
        match self.ports.link.signal_strength() {
            Some(level) => self.publish(Report::WifiStatus { level }).await,
            None => debug!("No signal strength available, skipping report"),
        }
    }

    async fn firmware_update(&self) {
        let _busy = self.activity.busy();

        info!("Starting firmware update");
        let event = match self.ports.updater.update().await {
            Ok(()) => {
                warn!("Firmware update downloaded, reboot pending");
                Event::OtaUpdateSucceeded
            }
            Err(e) => {
                error!(error = %e, "Firmware update failed");
                Event::OtaUpdateFailed
            }
        };
        self.events.post(event).await;
    }

    async fn fetch_file(&self, url: &str, path: &Path) {
        let _busy = self.activity.busy();

        match self.ports.sync.fetch_file(url, path).await {
            Ok(bytes) => info!(url, path = %path.display(), bytes, "File fetched"),
            Err(e) => error!(url, path = %path.display(), error = %e, "File fetch failed"),
        }
    }

    async fn publish(&self, report: Report) {
        let subtopic = report.subtopic().as_str();
        let message = report.into_message(&self.topics);

        let outcome =
            tokio::time::timeout(PUBLISH_TIMEOUT, self.ports.sink.publish(&message)).await;
        match outcome {
            Ok(Ok(())) => debug!(topic = %message.topic, "Telemetry published"),
            Ok(Err(e)) => {
                TELEMETRY_FAILURES.with_label_values(&[subtopic]).inc();
                warn!(topic = %message.topic, error = %e, "Telemetry publish failed");
            }
            Err(_) => {
                TELEMETRY_FAILURES.with_label_values(&[subtopic]).inc();
                warn!(topic = %message.topic, "Telemetry publish timed out");
            }
        }
    }
}
