//! Suspend gate backed by the quiescence registry.
//!
//! Sleep freezes every unit, so the gate refuses to suspend while any
//! registered unit still reports busy. A new unit that must not be frozen
//! mid-flight only has to register; the controller needs no change.

use std::sync::Arc;

use async_trait::async_trait;
use shared_bus::QuiescenceRegistry;
use tracing::warn;

use crate::domain::errors::PlatformError;
use crate::ports::outbound::Platform;

/// Wraps a platform and checks quiescence before suspending.
pub struct QuiescentPlatform {
    inner: Arc<dyn Platform>,
    registry: Arc<QuiescenceRegistry>,
}

impl QuiescentPlatform {
    pub fn new(inner: Arc<dyn Platform>, registry: Arc<QuiescenceRegistry>) -> Self {
        Self { inner, registry }
    }
}

#[async_trait]
impl Platform for QuiescentPlatform {
    async fn suspend(&self) -> Result<(), PlatformError> {
        let busy = self.registry.busy_units();
        if !busy.is_empty() {
            warn!(busy = ?busy, "Suspend refused, units still busy");
            return Err(PlatformError::NotQuiescent { busy });
        }
        self.inner.suspend().await
    }

    fn reboot(&self) {
        self.inner.reboot();
    }
}
