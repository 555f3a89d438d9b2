//! # Main Controller (ac-04)
//!
//! The top-level state machine of the access controller. It sequences
//! credential evaluation, lock actuation, sleep/wake and user-facing
//! status, driven entirely by events from its mailbox.
//!
//! ## Structure
//!
//! - [`Controller`] is the pure transition core: `step(event) -> actions`.
//!   It owns the state and the connectivity flags and never performs I/O.
//! - [`ControllerTask`] owns the mailbox and the one-shot timer and applies
//!   actions through the ports.
//!
//! ## Read Loop
//!
//! ```text
//! Init → InitialLock → WaitRead ─timer→ StartRfidRead → WaitRfid
//!                          ▲                               │
//!                          │      valid scan → RfidValid ──┼─ allowed → Unlocked ─timer→ Lock ─┐
//!                          │    invalid scan → RfidInvalid │            └ door open → UnlockedOpen
//!                          └───────────────────────────────┴───────────────────────────────────┘
//! ```
//!
//! ## Sleep Path
//!
//! ```text
//! WaitRfid ─30 s on battery→ GoToSleep → PreSleep1 → PreSleep2 (until link down)
//!          → Sleeping → WakeUp → Waking (until link up, max 15 s) → StartRfidRead
//! ```
//!
//! Restoring power during `PreSleep1`/`PreSleep2` aborts the sleep.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::credentials::{find_record, AclCredentials};
pub use adapters::platform::QuiescentPlatform;
pub use domain::action::{Action, Cue, Screen};
pub use domain::errors::PlatformError;
pub use domain::machine::{Controller, Flags, UNKNOWN_TAG_ERROR, UNKNOWN_TAG_NAME};
pub use domain::state::ControllerState;
pub use domain::timing::ControllerTimings;
pub use ports::outbound::{Annunciator, CredentialSource, LockActuator, Platform};
pub use service::{ControllerPorts, ControllerTask};
