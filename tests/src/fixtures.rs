//! # Test Fixtures
//!
//! In-memory stand-ins for the authority server, the broker and the radio.

use std::collections::VecDeque;
use std::sync::Arc;

use ac_02_acl_sync::{
    AclTransport, BodyStream, FetchRequest, FetchResponse, ResponseHead, TransportError,
};
use ac_03_network::{
    FirmwareUpdater, LinkError, LinkPort, PublishError, TelemetryMessage, TelemetrySink,
    UpdateError,
};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

/// Bytes served per body chunk.
const CHUNK: usize = 64;

// =============================================================================
// AUTHORITY SERVER
// =============================================================================

/// One scripted server reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub advertised: Option<String>,
    pub body: Vec<u8>,
    /// Fail the transfer after the first chunk.
    pub interrupted: bool,
}

impl Reply {
    /// 200 with the body and its digest header.
    pub fn ok(body: &[u8], digest: &str) -> Self {
        Self {
            status: 200,
            advertised: Some(digest.to_string()),
            body: body.to_vec(),
            interrupted: false,
        }
    }

    /// 200 confirming `digest` is current, with no body.
    pub fn current(digest: &str) -> Self {
        Self {
            status: 200,
            advertised: Some(digest.to_string()),
            body: Vec::new(),
            interrupted: false,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            advertised: None,
            body: Vec::new(),
            interrupted: false,
        }
    }

    pub fn interrupted(mut self) -> Self {
        self.interrupted = true;
        self
    }
}

/// Serves scripted replies in order and records every request.
#[derive(Default)]
pub struct ScriptedServer {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedServer {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::default(),
        })
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().push_back(reply);
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }

    /// Digest header sent with the most recent request.
    pub fn last_digest_header(&self) -> Option<String> {
        self.requests
            .lock()
            .last()
            .and_then(|r| r.digest_header.clone())
    }
}

struct ScriptedBody {
    chunks: VecDeque<Bytes>,
    fail_after_first: bool,
    served: usize,
}

#[async_trait]
impl BodyStream for ScriptedBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        if self.fail_after_first && self.served == 1 {
            return Err(TransportError::Http("connection reset by peer".into()));
        }
        self.served += 1;
        Ok(self.chunks.pop_front())
    }
}

#[async_trait]
impl AclTransport for ScriptedServer {
    async fn get(&self, request: &FetchRequest) -> Result<FetchResponse, TransportError> {
        self.requests.lock().push(request.clone());
        let reply = self
            .replies
            .lock()
            .pop_front()
            .ok_or_else(|| TransportError::Connect("server unreachable".into()))?;

        let chunks = reply
            .body
            .chunks(CHUNK)
            .map(Bytes::copy_from_slice)
            .collect();

        Ok(FetchResponse {
            head: ResponseHead {
                status: reply.status,
                content_length: Some(reply.body.len() as u64),
                advertised_digest: reply.advertised,
            },
            body: Box::new(ScriptedBody {
                chunks,
                fail_after_first: reply.interrupted,
                served: 0,
            }),
        })
    }
}

// =============================================================================
// BROKER AND RADIO
// =============================================================================

/// Keeps every published message.
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<TelemetryMessage>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<TelemetryMessage> {
        self.messages.lock().clone()
    }

    /// Messages whose topic ends with `subtopic`.
    pub fn on(&self, subtopic: &str) -> Vec<TelemetryMessage> {
        self.messages
            .lock()
            .iter()
            .filter(|m| m.topic.ends_with(subtopic))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TelemetrySink for RecordingSink {
    async fn publish(&self, message: &TelemetryMessage) -> Result<(), PublishError> {
        self.messages.lock().push(message.clone());
        Ok(())
    }
}

/// A link that always comes up with a fixed signal level.
pub struct FixedLink {
    pub level: i32,
}

#[async_trait]
impl LinkPort for FixedLink {
    async fn connect(&self) -> Result<(), LinkError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), LinkError> {
        Ok(())
    }

    fn signal_strength(&self) -> Option<i32> {
        Some(self.level)
    }
}

/// Firmware updater that is never used by these scenarios.
pub struct NoUpdates;

#[async_trait]
impl FirmwareUpdater for NoUpdates {
    async fn update(&self) -> Result<(), UpdateError> {
        Err(UpdateError::Rejected("no image".into()))
    }
}
