//! Domain layer for the Network Orchestrator.

pub mod errors;
pub mod settings;
pub mod telemetry;
