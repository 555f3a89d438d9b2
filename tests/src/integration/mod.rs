//! Cross-crate scenarios.

pub mod access_flows;
pub mod acl_lifecycle;
