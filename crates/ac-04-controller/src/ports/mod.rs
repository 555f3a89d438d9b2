//! Ports for the Main Controller.

pub mod outbound;
