//! # Outbound Ports (Driven Ports)
//!
//! The HTTP transport the sync client needs. Production uses
//! `HttpTransport` (adapters/http.rs); tests script responses in memory.

use crate::domain::errors::TransportError;
use crate::domain::request::{FetchRequest, ResponseHead};
use async_trait::async_trait;
use bytes::Bytes;

/// Streaming response body.
#[async_trait]
pub trait BodyStream: Send {
    /// Next chunk, or `None` at end of body.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError>;
}

/// Response whose head has been read and whose body has not.
///
/// Dropping it without draining the body abandons the transfer.
pub struct FetchResponse {
    pub head: ResponseHead,
    pub body: Box<dyn BodyStream>,
}

/// Authenticated GET over the untrusted network.
#[async_trait]
pub trait AclTransport: Send + Sync {
    /// Send the request and return once the response head is available.
    async fn get(&self, request: &FetchRequest) -> Result<FetchResponse, TransportError>;
}
