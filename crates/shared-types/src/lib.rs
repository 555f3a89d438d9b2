//! # Shared Types Crate
//!
//! This crate contains the domain entities and the mailbox message types
//! shared by every execution unit of the access controller.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-unit types are defined here.
//! - **Owned Payloads**: Every `Event` and `Command` owns its payload by value.
//!   Sending moves the payload into the mailbox; nothing is shared after send.
//! - **Exhaustive Matching**: Messages are sum types, one variant per kind,
//!   each carrying only the fields it needs.

pub mod entities;
pub mod errors;
pub mod ipc;

pub use entities::*;
pub use errors::*;
pub use ipc::*;
