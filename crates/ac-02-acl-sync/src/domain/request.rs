//! # Sync Values
//!
//! Transient values describing one fetch attempt. Built per call and
//! discarded after.

use shared_types::{Digest, ExpectedDigest};

/// Header carrying the client's digest on the request and the server's
/// current digest on the response.
pub const DIGEST_HEADER: &str = "X-Hash-SHA224";

/// Placeholder substituted with the resource identifier in URL templates.
pub const RESOURCE_PLACEHOLDER: &str = "{resource}";

/// Build the ACL URL from a template such as
/// `https://host/auth/api/v0/resources/{resource}/acl`.
///
/// A template without the placeholder is used as-is.
pub fn acl_url(template: &str, resource: &str) -> String {
    template.replace(RESOURCE_PLACEHOLDER, resource)
}

/// One conditional-fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    /// Target URL.
    pub url: String,
    /// Digest presented to the server.
    pub expected: ExpectedDigest,
}

/// What a successful sync did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new list was installed.
    Updated { digest: Digest, bytes: u64 },
    /// The stored list is current. Nothing on disk changed.
    Unchanged {
        /// `true` when the server confirmed via header and the body was
        /// never read; `false` when the downloaded body hashed to the
        /// stored digest.
        confirmed_by_server: bool,
    },
}

/// Result of one successful sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub request: SyncRequest,
    /// HTTP status (always 200 for a successful sync).
    pub status: u16,
    /// Digest advertised by the server, if any.
    pub advertised_digest: Option<String>,
    pub outcome: SyncOutcome,
}

impl SyncResult {
    /// Digest of the list now installed, when known.
    pub fn digest(&self) -> Option<&Digest> {
        match &self.outcome {
            SyncOutcome::Updated { digest, .. } => Some(digest),
            SyncOutcome::Unchanged { .. } => self.request.expected.digest(),
        }
    }

    /// Whether a new list was installed.
    pub fn is_updated(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Updated { .. })
    }
}

/// A GET as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    /// Value for [`DIGEST_HEADER`], if the request is conditional.
    pub digest_header: Option<String>,
}

/// Status line and headers the client consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u16,
    /// `None` for chunked transfers.
    pub content_length: Option<u64>,
    /// Value of [`DIGEST_HEADER`], trimmed and lower-cased.
    pub advertised_digest: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acl_url_substitutes_resource() {
        assert_eq!(
            acl_url(
                "https://my-server.org:443/auth/api/v0/resources/{resource}/acl",
                "frontdoor"
            ),
            "https://my-server.org:443/auth/api/v0/resources/frontdoor/acl"
        );
        assert_eq!(acl_url("https://fixed/acl", "x"), "https://fixed/acl");
    }

    #[test]
    fn test_result_digest_falls_back_to_expected() {
        let digest = Digest::parse(&"ab".repeat(28)).unwrap();
        let result = SyncResult {
            request: SyncRequest {
                url: "u".into(),
                expected: ExpectedDigest::Known(digest.clone()),
            },
            status: 200,
            advertised_digest: Some(digest.to_string()),
            outcome: SyncOutcome::Unchanged {
                confirmed_by_server: true,
            },
        };
        assert_eq!(result.digest(), Some(&digest));
        assert!(!result.is_updated());
    }
}
