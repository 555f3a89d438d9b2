//! # Domain Layer
//!
//! - `request` - sync request/result values, URL templating, header name
//! - `errors` - transport and sync errors

pub mod errors;
pub mod request;
