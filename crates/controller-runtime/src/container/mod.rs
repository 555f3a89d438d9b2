//! # Runtime Container
//!
//! Configuration and the shared handles every unit is built from.

pub mod config;
pub mod context;

pub use config::{ConfigError, ControllerConfig};
pub use context::{AppContext, ContextError};
