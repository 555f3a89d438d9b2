//! # Access Flows
//!
//! The controller (ac-04) and the network orchestrator (ac-03) wired through
//! real mailboxes, with the ACL delivered by ac-02 into ac-01.
//!
//! Mailbox traffic is pumped by hand so every step is deterministic:
//!
//! ```text
//! Controller ──Action::Network(cmd)──→ orchestrator.handle(cmd)
//!      ↑                                        │
//!      └──────────── event mailbox ─────────────┘
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use ac_01_acl_integrity::{digest_reader, AclIntegrityApi, AclPaths, AclStore, StorageMount};
    use ac_02_acl_sync::AclSyncClient;
    use ac_03_network::{NetworkOrchestrator, NetworkPorts, NetworkSettings};
    use ac_04_controller::{
        AclCredentials, Action, Controller, ControllerState, ControllerTimings, UNKNOWN_TAG_ERROR,
    };
    use shared_bus::{MailboxReceiver, QuiescenceRegistry};
    use shared_types::{Command, Event};
    use tempfile::TempDir;

    use crate::fixtures::{FixedLink, NoUpdates, RecordingSink, Reply, ScriptedServer};

    const ACL: &[u8] = b"tag,name,allowed\n\
        0001234567,Ada Lovelace,allowed\n\
        0000000099,Grace Hopper,denied\n";

    struct Site {
        _dir: TempDir,
        store: Arc<AclStore>,
        sink: Arc<RecordingSink>,
        network: NetworkOrchestrator,
        commands: MailboxReceiver<Command>,
        events: MailboxReceiver<Event>,
        controller: Controller,
        credentials: AclCredentials,
    }

    fn site(replies: Vec<Reply>) -> Site {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(AclStore::new(AclPaths::in_dir(dir.path())));
        let sink = Arc::new(RecordingSink::default());
        let registry = QuiescenceRegistry::new();

        let (events_tx, events) =
            shared_bus::open("controller", 8, Duration::from_millis(50)).unwrap();
        let (commands_tx, commands) =
            shared_bus::open("network", 8, Duration::from_millis(50)).unwrap();

        let sync = AclSyncClient::new(
            ScriptedServer::new(replies),
            store.clone(),
            StorageMount::new(dir.path()),
            "https://auth.example/api/v0/resources/frontdoor/acl",
        );
        let network = NetworkOrchestrator::new(
            NetworkPorts {
                link: Arc::new(FixedLink { level: -58 }),
                sink: sink.clone(),
                updater: Arc::new(NoUpdates),
                sync: Arc::new(sync),
            },
            NetworkSettings::default(),
            events_tx,
            commands_tx,
            registry.register("network"),
        );

        Site {
            _dir: dir,
            credentials: AclCredentials::new(store.clone()),
            store,
            sink,
            network,
            commands,
            events,
            controller: Controller::new(ControllerTimings::default()),
        }
    }

    impl Site {
        /// Step the controller and hand its network commands to the
        /// orchestrator, then drain the orchestrator's own follow-ups.
        async fn step(&mut self, event: Option<Event>) -> Vec<Action> {
            let actions = self.controller.step(event, &self.credentials);
            for action in &actions {
                if let Action::Network(command) = action {
                    self.network.handle(command.clone()).await;
                }
            }
            self.drain_network().await;
            actions
        }

        async fn drain_network(&mut self) {
            while let Some(command) = self.commands.try_recv().unwrap() {
                self.network.handle(command).await;
            }
        }

        /// Feed every event the orchestrator posted back to the controller.
        async fn deliver_events(&mut self) {
            while let Some(event) = self.events.try_recv().unwrap() {
                self.step(Some(event)).await;
            }
        }

        /// Boot to `WaitRfid`, syncing the ACL on the way.
        async fn boot(&mut self) {
            self.step(None).await; // Init -> InitialLock
            self.step(None).await; // InitialLock -> WaitRead, Connect
            self.deliver_events().await;
            self.step(Some(Event::TimerExpired)).await;
            self.step(None).await;
            assert_eq!(self.controller.state(), ControllerState::WaitRfid);
        }
    }

    fn acl_reply() -> Reply {
        Reply::ok(ACL, digest_reader(ACL).unwrap().as_str())
    }

    // =========================================================================
    // BOOT
    // =========================================================================

    #[tokio::test]
    async fn test_boot_without_acl_syncs_and_reports() {
        let mut site = site(vec![acl_reply()]);
        assert!(site.store.validate().unwrap_err().is_not_provisioned());

        site.boot().await;

        assert!(site.controller.flags().net_connected);
        assert_eq!(
            site.store.validate().unwrap(),
            digest_reader(ACL).unwrap()
        );

        let updates = site.sink.on("acl/update");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].payload["status"], "downloaded");
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_failure_and_denies() {
        let mut site = site(vec![]);
        site.boot().await;

        let updates = site.sink.on("acl/update");
        assert_eq!(updates[0].payload["status"], "failed");

        site.step(Some(Event::ValidScan { tag_id: 1234567 })).await;
        let actions = site.step(None).await;
        assert!(!actions.contains(&Action::Unlock));
        assert_eq!(site.controller.state(), ControllerState::WaitRead);
    }

    // =========================================================================
    // ACCESS DECISIONS
    // =========================================================================

    #[tokio::test]
    async fn test_member_granted_then_relocked() {
        let mut site = site(vec![acl_reply()]);
        site.boot().await;

        site.step(Some(Event::ValidScan { tag_id: 1234567 })).await;
        let actions = site.step(None).await;
        assert_eq!(site.controller.state(), ControllerState::Unlocked);
        assert!(actions.contains(&Action::Unlock));
        assert!(actions.contains(&Action::ArmTimer(Duration::from_secs(7))));

        let access = site.sink.on("personality/access");
        assert_eq!(access.len(), 1);
        assert_eq!(access[0].payload["member"], "Ada Lovelace");
        assert_eq!(access[0].payload["allowed"], true);

        site.step(Some(Event::TimerExpired)).await;
        let actions = site.step(None).await;
        assert!(actions.contains(&Action::Lock));
        assert_eq!(site.controller.state(), ControllerState::WaitRead);
    }

    #[tokio::test]
    async fn test_denied_member_is_reported_without_unlock() {
        let mut site = site(vec![acl_reply()]);
        site.boot().await;

        site.step(Some(Event::ValidScan { tag_id: 99 })).await;
        let actions = site.step(None).await;
        assert!(!actions.contains(&Action::Unlock));
        assert!(actions.contains(&Action::ArmTimer(Duration::from_secs(10))));

        let access = site.sink.on("personality/access");
        assert_eq!(access[0].payload["member"], "Grace Hopper");
        assert_eq!(access[0].payload["allowed"], false);
    }

    #[tokio::test]
    async fn test_unknown_tag_reports_padded_tag() {
        let mut site = site(vec![acl_reply()]);
        site.boot().await;

        site.step(Some(Event::ValidScan { tag_id: 42 })).await;
        let actions = site.step(None).await;
        assert_eq!(site.controller.state(), ControllerState::WaitRead);
        assert!(!actions.contains(&Action::Unlock));
        assert!(actions.contains(&Action::ArmTimer(Duration::from_secs(8))));

        let errors = site.sink.on("personality/access");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].payload["error"], true);
        assert_eq!(errors[0].payload["errorText"], UNKNOWN_TAG_ERROR);
        assert_eq!(errors[0].payload["errorExt"], "0000000042");
    }

    // =========================================================================
    // SLEEP HANDSHAKE
    // =========================================================================

    #[tokio::test]
    async fn test_power_loss_sleeps_only_after_network_is_down() {
        let mut site = site(vec![acl_reply()]);
        site.boot().await;

        site.step(Some(Event::PowerLoss)).await;
        assert!(!site.sink.on("system/power").is_empty());

        // Grace period expires on battery.
        site.step(Some(Event::TimerExpired)).await;
        assert_eq!(site.controller.state(), ControllerState::GoToSleep);
        site.step(None).await;
        assert_eq!(site.controller.state(), ControllerState::PreSleep1);

        let sleep = site.sink.on("system/power");
        assert_eq!(sleep.last().unwrap().payload["state"], "sleep");

        // Disconnect is requested; the orchestrator answers through the
        // controller mailbox.
        site.step(Some(Event::TimerExpired)).await;
        assert_eq!(site.controller.state(), ControllerState::PreSleep2);
        assert!(!site.network.is_connected());
        site.deliver_events().await;
        assert!(!site.controller.flags().net_connected);

        let actions = site.step(Some(Event::TimerExpired)).await;
        assert!(actions.contains(&Action::Suspend));
        assert_eq!(site.controller.state(), ControllerState::Sleeping);
    }
}
