//! Adapters shipped with the controller.

pub mod credentials;
pub mod platform;
