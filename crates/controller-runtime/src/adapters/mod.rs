//! # Adapters
//!
//! Host implementations of the hardware and network ports.

pub mod hardware;
pub mod network;

pub use hardware::{HostPlatform, LoggingAnnunciator, LoggingLock};
pub use network::{HostLink, LogTelemetrySink, UnsupportedUpdater};
