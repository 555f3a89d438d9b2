//! # Ports Layer
//!
//! - `inbound.rs` - API the sync client, the credential reader and the
//!   runtime use to reach the stored ACL
pub mod inbound;
