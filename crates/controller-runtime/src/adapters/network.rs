//! Host stand-ins for the radio, broker and firmware updater.

use std::sync::atomic::{AtomicBool, Ordering};

use ac_03_network::{
    FirmwareUpdater, LinkError, LinkPort, PublishError, TelemetryMessage, TelemetrySink,
    UpdateError,
};
use async_trait::async_trait;
use tracing::info;

/// Link over the host's own network stack. Always associated once up.
#[derive(Debug, Default)]
pub struct HostLink {
    up: AtomicBool,
}

#[async_trait]
impl LinkPort for HostLink {
    async fn connect(&self) -> Result<(), LinkError> {
        self.up.store(true, Ordering::SeqCst);
        info!(target: "network", "Host link up");
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), LinkError> {
        self.up.store(false, Ordering::SeqCst);
        info!(target: "network", "Host link down");
        Ok(())
    }

    fn signal_strength(&self) -> Option<i32> {
        // Wired host links report a nominal strong signal.
        self.up.load(Ordering::SeqCst).then_some(-30)
    }
}

/// Writes every report to the log instead of a broker.
#[derive(Debug, Default)]
pub struct LogTelemetrySink;

#[async_trait]
impl TelemetrySink for LogTelemetrySink {
    async fn publish(&self, message: &TelemetryMessage) -> Result<(), PublishError> {
        info!(
            target: "telemetry",
            topic = %message.topic,
            payload = %message.payload,
            "Publish"
        );
        Ok(())
    }
}

/// No firmware channel on host builds.
#[derive(Debug, Default)]
pub struct UnsupportedUpdater;

#[async_trait]
impl FirmwareUpdater for UnsupportedUpdater {
    async fn update(&self) -> Result<(), UpdateError> {
        Err(UpdateError::Rejected(
            "firmware update is not available on this platform".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_host_link_reports_signal_only_when_up() {
        let link = HostLink::default();
        assert_eq!(link.signal_strength(), None);

        link.connect().await.unwrap();
        assert_eq!(link.signal_strength(), Some(-30));

        link.disconnect().await.unwrap();
        assert_eq!(link.signal_strength(), None);
    }

    #[tokio::test]
    async fn test_updater_rejects() {
        assert!(matches!(
            UnsupportedUpdater.update().await,
            Err(UpdateError::Rejected(_))
        ));
    }
}
