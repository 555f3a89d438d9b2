//! HTTPS transport over `reqwest` with rustls.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Certificate, Client, Identity, Response};
use tracing::debug;

use crate::domain::errors::TransportError;
use crate::domain::request::{FetchRequest, ResponseHead, DIGEST_HEADER};
use crate::ports::outbound::{AclTransport, BodyStream, FetchResponse};

/// Basic-auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// TLS material, loaded once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct ClientTls {
    /// PEM with the client certificate followed by its private key.
    pub identity_pem: Option<Arc<[u8]>>,
    /// PEM of the CA to trust instead of the built-in roots.
    pub ca_pem: Option<Arc<[u8]>>,
}

/// Settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub auth: Option<BasicAuth>,
    pub tls: ClientTls,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            auth: None,
            tls: ClientTls::default(),
        }
    }
}

/// `AclTransport` backed by a shared `reqwest::Client`.
pub struct HttpTransport {
    client: Client,
    auth: Option<BasicAuth>,
}

impl HttpTransport {
    /// Build the client. Fails on unusable TLS material.
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout);

        if let Some(pem) = &config.tls.identity_pem {
            let identity =
                Identity::from_pem(pem).map_err(|e| TransportError::Setup(e.to_string()))?;
            builder = builder.identity(identity);
        }
        if let Some(pem) = &config.tls.ca_pem {
            let ca = Certificate::from_pem(pem).map_err(|e| TransportError::Setup(e.to_string()))?;
            builder = builder.tls_built_in_root_certs(false).add_root_certificate(ca);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            auth: config.auth.clone(),
        })
    }
}

#[async_trait]
impl AclTransport for HttpTransport {
    async fn get(&self, request: &FetchRequest) -> Result<FetchResponse, TransportError> {
        let mut builder = self.client.get(&request.url);
        if let Some(auth) = &self.auth {
            builder = builder.basic_auth(&auth.user, Some(&auth.password));
        }
        if let Some(digest) = &request.digest_header {
            builder = builder.header(DIGEST_HEADER, digest.as_str());
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let head = ResponseHead {
            status: response.status().as_u16(),
            content_length: response.content_length(),
            advertised_digest: response
                .headers()
                .get(DIGEST_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_ascii_lowercase()),
        };
        debug!(
            url = %request.url,
            status = head.status,
            content_length = ?head.content_length,
            "Response head received"
        );

        Ok(FetchResponse {
            head,
            body: Box::new(ReqwestBody(response)),
        })
    }
}

struct ReqwestBody(Response);

#[async_trait]
impl BodyStream for ReqwestBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        self.0.chunk().await.map_err(map_reqwest_error)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else {
        TransportError::Http(e.to_string())
    }
}
