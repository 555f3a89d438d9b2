//! # Quiescence Registry
//!
//! A platform suspend freezes every execution unit, not just the caller.
//! Units with work that must not be frozen mid-flight register here and
//! flag themselves busy around that work; the suspend path refuses to
//! proceed while any registered unit is busy.

use parking_lot::RwLock;
use shared_types::UnitActivity;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Registry of units that take part in the suspend handshake.
#[derive(Debug, Default)]
pub struct QuiescenceRegistry {
    units: RwLock<BTreeMap<&'static str, Arc<AtomicBool>>>,
}

impl QuiescenceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit. Registering the same name twice shares one flag.
    pub fn register(&self, unit: &'static str) -> ActivityHandle {
        let flag = self
            .units
            .write()
            .entry(unit)
            .or_insert_with(|| Arc::new(AtomicBool::new(false)))
            .clone();
        debug!(unit, "Unit registered for quiescence");
        ActivityHandle { unit, busy: flag }
    }

    /// Names of registered units currently busy.
    #[must_use]
    pub fn busy_units(&self) -> Vec<&'static str> {
        self.units
            .read()
            .iter()
            .filter(|(_, busy)| busy.load(Ordering::Acquire))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Whether every registered unit is idle.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        self.busy_units().is_empty()
    }

    /// Number of registered units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.read().len()
    }

    /// Whether no unit is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.read().is_empty()
    }
}

/// A unit's handle for reporting its activity.
#[derive(Debug, Clone)]
pub struct ActivityHandle {
    unit: &'static str,
    busy: Arc<AtomicBool>,
}

impl ActivityHandle {
    /// Report the unit's activity.
    pub fn set(&self, activity: UnitActivity) {
        self.busy
            .store(activity == UnitActivity::Busy, Ordering::Release);
    }

    /// Current activity.
    #[must_use]
    pub fn activity(&self) -> UnitActivity {
        if self.busy.load(Ordering::Acquire) {
            UnitActivity::Busy
        } else {
            UnitActivity::Idle
        }
    }

    /// Mark busy until the returned guard is dropped.
    #[must_use]
    pub fn busy(&self) -> BusyGuard<'_> {
        self.set(UnitActivity::Busy);
        BusyGuard { handle: self }
    }

    /// Unit name.
    #[must_use]
    pub fn unit(&self) -> &'static str {
        self.unit
    }
}

/// Resets the unit to idle on drop.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    handle: &'a ActivityHandle,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.handle.set(UnitActivity::Idle);
    }
}
