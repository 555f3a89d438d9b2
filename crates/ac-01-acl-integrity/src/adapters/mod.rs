//! # Adapters
//!
//! - `lock.rs` - process-level lock on the storage directory (fs2)
//! - `mount.rs` - in-process lock on the storage mount

pub mod lock;
pub mod mount;
