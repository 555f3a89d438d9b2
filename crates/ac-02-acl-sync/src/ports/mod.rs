//! # Ports Layer
//!
//! - `inbound.rs` - `AclSyncApi`, driven by the network unit
//! - `outbound.rs` - `AclTransport`, implemented over HTTPS

pub mod inbound;
pub mod outbound;
