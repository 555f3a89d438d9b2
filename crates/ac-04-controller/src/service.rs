//! # Controller Task
//!
//! Owns the controller mailbox, the single one-shot timer and the ports.
//! Each iteration polls the mailbox once, runs [`Controller::step`] and
//! applies the returned actions in order.
//!
//! The timer posts `Event::TimerExpired` into the same mailbox, so expiry
//! is ordered with every other event.

use std::sync::Arc;
use std::time::Duration;

use shared_bus::{MailboxReceiver, MailboxSender};
use shared_types::{Command, Event};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::action::Action;
use crate::domain::machine::Controller;
use crate::domain::state::ControllerState;
use crate::ports::outbound::{Annunciator, CredentialSource, LockActuator, Platform};

/// Collaborators the controller drives.
#[derive(Clone)]
pub struct ControllerPorts {
    pub lock: Arc<dyn LockActuator>,
    pub annunciator: Arc<dyn Annunciator>,
    pub credentials: Arc<dyn CredentialSource>,
    pub platform: Arc<dyn Platform>,
}

/// The controller execution unit.
pub struct ControllerTask {
    controller: Controller,
    ports: ControllerPorts,
    /// Sender into our own mailbox, used by the timer.
    own: MailboxSender<Event>,
    network: MailboxSender<Command>,
    poll_interval: Duration,
    timer: Option<JoinHandle<()>>,
}

impl ControllerTask {
    pub fn new(
        controller: Controller,
        ports: ControllerPorts,
        own: MailboxSender<Event>,
        network: MailboxSender<Command>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            controller,
            ports,
            own,
            network,
            poll_interval,
            timer: None,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Run until shutdown is signalled.
    pub async fn run(
        mut self,
        mut mailbox: MailboxReceiver<Event>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            mailbox = mailbox.name(),
            poll_ms = self.poll_interval.as_millis() as u64,
            "Controller started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let event = tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                event = mailbox.recv_timeout(self.poll_interval) => event,
            };

            self.iterate(event).await;
        }

        self.disarm();
        info!(state = %self.controller.state(), "Controller stopped");
    }

    /// One loop iteration. Returns the state afterwards.
    pub async fn iterate(&mut self, event: Option<Event>) -> ControllerState {
        let actions = self
            .controller
            .step(event, self.ports.credentials.as_ref());
        for action in actions {
            self.apply(action).await;
        }
        self.controller.state()
    }

    async fn apply(&mut self, action: Action) {
        match action {
            Action::Lock => self.ports.lock.engage(),
            Action::Unlock => self.ports.lock.release(),
            Action::ArmTimer(period) => self.arm(period),
            Action::DisarmTimer => self.disarm(),
            Action::Show(screen) => self.ports.annunciator.show(screen),
            Action::ShowAccess { name, allowed } => {
                self.ports.annunciator.show_access(&name, allowed)
            }
            Action::Tone(cue) => self.ports.annunciator.tone(cue),
            Action::Network(command) => {
                // Failures are logged by the mailbox; the decision stands.
                self.network.post(command).await;
            }
            Action::Suspend => {
                self.disarm();
                info!("Suspending platform");
                match self.ports.platform.suspend().await {
                    Ok(()) => info!("Platform woke"),
                    Err(e) => warn!(error = %e, "Platform did not suspend"),
                }
            }
            Action::Reboot => self.ports.platform.reboot(),
        }
    }

    fn arm(&mut self, period: Duration) {
        self.disarm();
        debug!(period_ms = period.as_millis() as u64, "Timer armed");

        let mailbox = self.own.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(period).await;
            mailbox.post(Event::TimerExpired).await;
        }));
    }

    fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for ControllerTask {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::{Cue, Screen};
    use crate::domain::errors::PlatformError;
    use crate::domain::timing::ControllerTimings;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared_types::{AuthorizationRecord, TagId};

    #[derive(Default)]
    struct Journal(Mutex<Vec<String>>);

    impl Journal {
        fn entries(&self) -> Vec<String> {
            self.0.lock().clone()
        }

        fn count(&self, entry: &str) -> usize {
            self.0.lock().iter().filter(|e| *e == entry).count()
        }
    }

    impl LockActuator for Journal {
        fn engage(&self) {
            self.0.lock().push("engage".into());
        }

        fn release(&self) {
            self.0.lock().push("release".into());
        }
    }

    impl Annunciator for Journal {
        fn show(&self, screen: Screen) {
            self.0.lock().push(format!("show {screen:?}"));
        }

        fn show_access(&self, name: &str, allowed: bool) {
            self.0.lock().push(format!("access {name} {allowed}"));
        }

        fn tone(&self, cue: Cue) {
            self.0.lock().push(format!("tone {cue:?}"));
        }
    }

    #[async_trait]
    impl Platform for Journal {
        async fn suspend(&self) -> Result<(), PlatformError> {
            self.0.lock().push("suspend".into());
            Ok(())
        }

        fn reboot(&self) {
            self.0.lock().push("reboot".into());
        }
    }

    struct OneMember;

    impl CredentialSource for OneMember {
        fn lookup(&self, tag_id: TagId) -> Option<AuthorizationRecord> {
            (tag_id == 1001).then(|| AuthorizationRecord::new(1001, "Ada", true))
        }
    }

    struct Rig {
        task: ControllerTask,
        journal: Arc<Journal>,
        events_tx: MailboxSender<Event>,
        events: MailboxReceiver<Event>,
        network: MailboxReceiver<Command>,
    }

    fn rig() -> Rig {
        let journal = Arc::new(Journal::default());
        let (events_tx, events) =
            shared_bus::open("controller", 8, Duration::from_millis(50)).unwrap();
        let (network_tx, network) =
            shared_bus::open("network", 8, Duration::from_millis(50)).unwrap();

        let task = ControllerTask::new(
            Controller::new(ControllerTimings::default()),
            ControllerPorts {
                lock: journal.clone(),
                annunciator: journal.clone(),
                credentials: Arc::new(OneMember),
                platform: journal.clone(),
            },
            events_tx.clone(),
            network_tx,
            Duration::from_millis(20),
        );

        Rig {
            task,
            journal,
            events_tx,
            events,
            network,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_expiry_arrives_through_mailbox() {
        let mut rig = rig();

        rig.task.iterate(None).await;
        assert_eq!(rig.task.iterate(None).await, ControllerState::WaitRead);
        assert_eq!(rig.network.try_recv().unwrap(), Some(Command::Connect));
        assert_eq!(rig.journal.count("engage"), 1);

        let fired = rig.events.recv_timeout(Duration::from_secs(5)).await;
        assert_eq!(fired, Some(Event::TimerExpired));
        assert_eq!(
            rig.task.iterate(fired).await,
            ControllerState::StartRfidRead
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_cancels_expiry() {
        let mut rig = rig();
        rig.task.arm(Duration::from_secs(1));
        rig.task.disarm();

        let fired = rig.events.recv_timeout(Duration::from_secs(5)).await;
        assert_eq!(fired, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decision_stands_when_telemetry_fails() {
        let mut rig = rig();
        // Nobody is listening on the network mailbox any more.
        drop(rig.network);

        rig.task.iterate(None).await;
        rig.task.iterate(None).await;
        rig.task.iterate(Some(Event::TimerExpired)).await;
        rig.task.iterate(None).await;
        rig.task.iterate(Some(Event::ValidScan { tag_id: 1001 })).await;
        assert_eq!(rig.task.iterate(None).await, ControllerState::Unlocked);

        assert_eq!(rig.journal.count("release"), 1);
        assert!(rig.journal.entries().contains(&"access Ada true".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_grants_then_relocks() {
        let Rig {
            task,
            journal,
            events_tx,
            events,
            network: _network,
        } = rig();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(task.run(events, shutdown_rx));

        // Boot: lock, 3 s wait, then reading.
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(journal.count("engage"), 1);
        assert!(journal.entries().contains(&"show Idle".to_string()));

        assert!(events_tx.post(Event::ValidScan { tag_id: 1001 }).await);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(journal.count("release"), 1);

        // 7 s auto-relock.
        tokio::time::sleep(Duration::from_secs(8)).await;
        assert_eq!(journal.count("engage"), 2);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
