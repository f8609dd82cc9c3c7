//! Pseudo-identity for anonymous submitters.
//!
//! The first time someone submits from a given client, an opaque
//! `author_…` token is derived from their email and the current time and
//! kept in local storage. Every later submission from that client reuses it,
//! and edit/delete buttons are shown for comments carrying the same token.
//!
//! The token is not authentication. It is not unique across devices, it
//! disappears when storage is cleared, and anyone who reads a token off the
//! comment feed can present it. The server repeats the equality check, but
//! that only protects against accidents.

pub mod storage;

use chrono::{DateTime, Utc};
use sha1::{Digest, Sha1};

pub use storage::{FileStorage, LocalStorage, MemoryStorage, StorageError};

/// Storage key the token lives under.
pub const AUTHOR_ID_STORAGE_KEY: &str = "blog_author_id";
pub const AUTHOR_ID_PREFIX: &str = "author_";
const TOKEN_LENGTH: usize = 16;

/// Derive a fresh token from an email and an instant.
pub fn derive_author_id(email: &str, now: DateTime<Utc>) -> String {
    let mut hasher = Sha1::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    hasher.update(now.timestamp_millis().to_string().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{}{}", AUTHOR_ID_PREFIX, &digest[..TOKEN_LENGTH])
}

/// Return the token stored in `storage`, issuing and persisting one first if
/// there is none yet.
pub fn issue_author_id(
    email: &str,
    now: DateTime<Utc>,
    storage: &dyn LocalStorage,
) -> Result<String, StorageError> {
    if let Some(existing) = storage
        .get_item(AUTHOR_ID_STORAGE_KEY)
        .filter(|id| !id.is_empty())
    {
        return Ok(existing);
    }

    let author_id = derive_author_id(email, now);
    storage.set_item(AUTHOR_ID_STORAGE_KEY, &author_id)?;
    log::debug!("Issued new pseudo-identity {}", author_id);
    Ok(author_id)
}

/// The token as seen by one mounted client: read from storage once, written
/// at most once.
#[derive(Debug)]
pub struct PseudoIdentity<S> {
    storage: S,
    current: Option<String>,
}

impl<S: LocalStorage> PseudoIdentity<S> {
    pub fn mount(storage: S) -> Self {
        let current = storage
            .get_item(AUTHOR_ID_STORAGE_KEY)
            .filter(|id| !id.is_empty());
        Self { storage, current }
    }

    pub fn author_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Token for a submission made with `email`, issuing one lazily.
    pub fn ensure(&mut self, email: &str) -> Result<String, StorageError> {
        if let Some(id) = &self.current {
            return Ok(id.clone());
        }
        let id = issue_author_id(email, Utc::now(), &self.storage)?;
        self.current = Some(id.clone());
        Ok(id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn test_derived_token_shape() {
        let id = derive_author_id("ana@example.com", at(1_700_000_000_000));
        assert!(id.starts_with(AUTHOR_ID_PREFIX));
        assert_eq!(id.len(), AUTHOR_ID_PREFIX.len() + TOKEN_LENGTH);
        assert!(id[AUTHOR_ID_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_derived_token_depends_on_time() {
        let a = derive_author_id("ana@example.com", at(1_700_000_000_000));
        let b = derive_author_id("ana@example.com", at(1_700_000_000_001));
        assert_ne!(a, b);
        assert_eq!(a, derive_author_id("ana@example.com", at(1_700_000_000_000)));
    }

    #[test]
    fn test_issue_is_lazy_and_sticky() {
        let storage = MemoryStorage::new();
        let first = issue_author_id("ana@example.com", at(1), &storage).unwrap();
        assert_eq!(storage.get_item(AUTHOR_ID_STORAGE_KEY), Some(first.clone()));

        // a different email later on the same client keeps the first token
        let second = issue_author_id("bob@example.com", at(2), &storage).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_existing_token_is_reused() {
        let storage = MemoryStorage::with_item(AUTHOR_ID_STORAGE_KEY, "author_123");
        let id = issue_author_id("ana@example.com", at(1), &storage).unwrap();
        assert_eq!(id, "author_123");
    }

    #[test]
    fn test_mount_reads_once_and_ensure_writes_once() {
        let mut identity = PseudoIdentity::mount(MemoryStorage::new());
        assert_eq!(identity.author_id(), None);

        let id = identity.ensure("ana@example.com").unwrap();
        assert_eq!(identity.author_id(), Some(id.as_str()));
        assert_eq!(identity.ensure("other@example.com").unwrap(), id);
        assert_eq!(
            identity.storage().get_item(AUTHOR_ID_STORAGE_KEY),
            Some(id)
        );
    }

    #[test]
    fn test_mount_picks_up_stored_token() {
        let identity =
            PseudoIdentity::mount(MemoryStorage::with_item(AUTHOR_ID_STORAGE_KEY, "author_123"));
        assert_eq!(identity.author_id(), Some("author_123"));
    }
}
