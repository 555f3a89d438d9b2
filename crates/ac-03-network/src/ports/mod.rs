//! Ports for the Network Orchestrator.

pub mod outbound;
