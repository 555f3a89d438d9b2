//! # Access Controller Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Scripted transport, recording sink, fixed link
//! └── integration/      # Cross-crate scenarios
//!     ├── acl_lifecycle.rs   # ac-01 + ac-02
//!     └── access_flows.rs    # ac-01 + ac-02 + ac-03 + ac-04
//!
//! tests/benches/
//! └── acl_benchmarks.rs # Digest streaming and credential lookup
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ac-tests
//!
//! # By category
//! cargo test -p ac-tests integration::acl_lifecycle::
//! cargo test -p ac-tests integration::access_flows::
//!
//! # Benchmarks
//! cargo bench -p ac-tests
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod fixtures;
pub mod integration;
