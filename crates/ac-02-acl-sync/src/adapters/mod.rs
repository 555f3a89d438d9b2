//! # Adapters
//!
//! - `http.rs` - `AclTransport` over reqwest/rustls with basic auth and
//!   optional mutual TLS

pub mod http;
