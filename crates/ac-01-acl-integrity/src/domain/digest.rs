//! # ACL Digest
//!
//! SHA-224 over the raw ACL bytes, computed in fixed-size chunks so memory
//! use does not depend on the size of the list.

use sha2::{Digest as _, Sha224};
use shared_types::{is_lower_hex, Digest, DigestError, DIGEST_HEX_LEN, DIGEST_LEN};
use std::io::{self, Read};

/// Chunk size used when streaming the blob through the hasher.
pub const CHUNK_SIZE: usize = 256;

/// A digest being computed over a byte stream.
#[derive(Clone, Default)]
pub struct IncrementalDigest {
    hasher: Sha224,
    bytes: u64,
}

impl IncrementalDigest {
    /// Start a new digest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk.
    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.bytes += chunk.len() as u64;
    }

    /// Bytes consumed so far.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Finish and render the digest.
    pub fn finalize(self) -> Digest {
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(&self.hasher.finalize());
        Digest::from_bytes(&out)
    }
}

/// Hash everything `reader` yields, [`CHUNK_SIZE`] bytes at a time.
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<Digest> {
    let mut digest = IncrementalDigest::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        digest.update(&buf[..n]);
    }
    Ok(digest.finalize())
}

/// Parse the contents of a digest file.
///
/// The text is fenced at the first NUL and surrounding whitespace is
/// trimmed, so a trailing newline or a C-style terminator is tolerated.
/// Anything else that is not exactly 56 lower-case hex characters is
/// rejected; the stored text must be byte-identical to a computed digest.
pub fn parse_digest_file(raw: &[u8]) -> Result<Digest, DigestError> {
    let fenced = raw.split(|b| *b == 0).next().unwrap_or_default();
    let trimmed = fenced.trim_ascii();
    if trimmed.len() != DIGEST_HEX_LEN {
        return Err(DigestError::InvalidLength {
            expected: DIGEST_HEX_LEN,
            actual: trimmed.len(),
        });
    }
    if let Some(offset) = trimmed.iter().position(|b| !is_lower_hex(*b)) {
        return Err(DigestError::NonHex { offset });
    }
    // All bytes are ASCII hex at this point.
    let text: String = trimmed.iter().map(|b| *b as char).collect();
    Digest::parse(&text)
}
