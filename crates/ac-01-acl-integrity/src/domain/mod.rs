//! # Domain Layer
//!
//! Pure logic for the ACL integrity unit: digest computation, digest-file
//! parsing, path layout and errors. No locking and no mutation here.

pub mod digest;
pub mod errors;
pub mod paths;
