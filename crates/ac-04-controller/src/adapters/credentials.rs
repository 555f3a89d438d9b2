//! # ACL Credential Lookup
//!
//! Resolves tags against the stored ACL blob, read through the integrity
//! store so the read serializes with validation and install.
//!
//! Expected format, one member per line:
//!
//! ```text
//! tag,name,allowed
//! 0001234567,Ada Lovelace,allowed
//! 0000000042,Bob Banned,denied
//! ```
//!
//! A header line, blank lines and malformed lines are skipped. An absent
//! or unreadable list resolves every tag to unknown (deny).

use std::sync::Arc;

use ac_01_acl_integrity::AclIntegrityApi;
use shared_types::{AuthorizationRecord, TagId};
use tracing::{debug, warn};

use crate::ports::outbound::CredentialSource;

/// `CredentialSource` over the stored ACL.
pub struct AclCredentials {
    store: Arc<dyn AclIntegrityApi>,
}

impl AclCredentials {
    pub fn new(store: Arc<dyn AclIntegrityApi>) -> Self {
        Self { store }
    }
}

impl CredentialSource for AclCredentials {
    fn lookup(&self, tag_id: TagId) -> Option<AuthorizationRecord> {
        let blob = match self.store.read_acl() {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                warn!(tag_id, "No ACL installed, denying");
                return None;
            }
            Err(e) => {
                warn!(tag_id, error = %e, "ACL unreadable, denying");
                return None;
            }
        };

        let record = find_record(&blob, tag_id);
        if record.is_none() {
            debug!(tag_id, "Tag not on ACL");
        }
        record
    }
}

/// Find `tag_id` in a CSV blob.
pub fn find_record(blob: &[u8], tag_id: TagId) -> Option<AuthorizationRecord> {
    String::from_utf8_lossy(blob)
        .lines()
        .filter_map(parse_line)
        .find(|record| record.tag_id == tag_id)
}

fn parse_line(line: &str) -> Option<AuthorizationRecord> {
    let mut fields = line.splitn(3, ',').map(str::trim);
    let tag_id = fields.next()?.parse::<TagId>().ok()?;
    let name = fields.next()?;
    let allowed = parse_allowed(fields.next()?);
    Some(AuthorizationRecord::new(tag_id, name, allowed))
}

fn parse_allowed(field: &str) -> bool {
    matches!(
        field.to_ascii_lowercase().as_str(),
        "allowed" | "true" | "yes" | "1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_01_acl_integrity::{AclPaths, AclStore};
    use std::fs;

    const ACL: &[u8] = b"tag,name,allowed\n\
        0001234567,Ada Lovelace,allowed\n\
        42, Bob Banned , denied\n\
        \n\
        garbage line\n\
        0000000077,Cy,1\r\n";

    #[test]
    fn test_find_record() {
        let ada = find_record(ACL, 1234567).unwrap();
        assert_eq!(ada.display_name, "Ada Lovelace");
        assert!(ada.allowed);

        let bob = find_record(ACL, 42).unwrap();
        assert_eq!(bob.display_name, "Bob Banned");
        assert!(!bob.allowed);

        assert!(find_record(ACL, 77).unwrap().allowed);
        assert_eq!(find_record(ACL, 9), None);
    }

    #[test]
    fn test_lookup_reads_store() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AclPaths::in_dir(dir.path());
        let credentials = AclCredentials::new(Arc::new(AclStore::new(paths.clone())));

        assert_eq!(credentials.lookup(42), None);

        fs::write(&paths.blob, ACL).unwrap();
        assert_eq!(credentials.lookup(42).unwrap().display_name, "Bob Banned");
    }
}
