//! In-memory registry of staged upload sessions.
//!
//! Maps an opaque [`SessionKey`] to the local file an inbound image was written to.
//! Every operation touches a single key and is atomic with respect to other
//! operations on that key, which is all the lifecycle needs: for one session,
//! "upload" and "delete" race through [`StagingStore::claim`] and exactly one wins.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Opaque session handle embedded in inline keyboard callback data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    /// Generates a fresh key: 32 lowercase hex characters from a random UUID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Whether `s` has the shape of a [`SessionKey::generate`] key.
    pub fn is_generated(s: &str) -> bool {
        s.len() == 32 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Where a session is in its lifecycle.
///
/// `Terminal` sessions are never stored; [`StagingStore::state`] reports it for
/// any key that is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Staged,
    Uploading,
    Terminal,
}

/// A staged image waiting for (or undergoing) its single upload attempt.
#[derive(Debug, Clone)]
pub struct StagedSession {
    pub path: PathBuf,
    /// Telegram user that sent the image
    pub owner: i64,
    pub created_at: DateTime<Utc>,
    pub state: SessionState,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// `put` was called with a key that is already live
    #[error("session key {0} is already staged")]
    DuplicateKey(SessionKey),

    /// Unknown key, or the session was already consumed
    #[error("session {0} not found or already processed")]
    NotFound(SessionKey),
}

/// Registry of live sessions, owned by the session controller.
#[derive(Debug, Default)]
pub struct StagingStore {
    sessions: DashMap<SessionKey, StagedSession>,
}

impl StagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly staged file under `key`.
    ///
    /// Never overwrites: a colliding key is a programming error and is reported
    /// as [`StoreError::DuplicateKey`], leaving the existing session untouched.
    pub fn put(&self, key: SessionKey, path: impl AsRef<Path>, owner: i64) -> Result<(), StoreError> {
        match self.sessions.entry(key) {
            Entry::Occupied(entry) => Err(StoreError::DuplicateKey(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(StagedSession {
                    path: path.as_ref().to_path_buf(),
                    owner,
                    created_at: Utc::now(),
                    state: SessionState::Staged,
                });
                Ok(())
            }
        }
    }

    /// Returns the staged path for `key`, whatever its state.
    pub fn get(&self, key: &SessionKey) -> Result<PathBuf, StoreError> {
        self.sessions
            .get(key)
            .map(|session| session.path.clone())
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    /// Returns a snapshot of the whole session record.
    pub fn session(&self, key: &SessionKey) -> Option<StagedSession> {
        self.sessions.get(key).map(|session| session.clone())
    }

    /// Moves a `Staged` session to `Uploading` and hands back its path.
    ///
    /// Fails with `NotFound` when the key is absent or another event already
    /// claimed it, so the second of two racing button presses loses cleanly.
    pub fn claim(&self, key: &SessionKey) -> Result<PathBuf, StoreError> {
        match self.sessions.get_mut(key) {
            Some(mut session) if session.state == SessionState::Staged => {
                session.state = SessionState::Uploading;
                Ok(session.path.clone())
            }
            _ => Err(StoreError::NotFound(key.clone())),
        }
    }

    /// Drops the entry for `key`. Removing an absent key is a no-op.
    pub fn remove(&self, key: &SessionKey) -> Option<PathBuf> {
        self.sessions.remove(key).map(|(_, session)| session.path)
    }

    /// Paths of every live session
    pub fn paths(&self) -> Vec<PathBuf> {
        self.sessions.iter().map(|entry| entry.path.clone()).collect()
    }

    pub fn state(&self, key: &SessionKey) -> SessionState {
        self.sessions
            .get(key)
            .map(|session| session.state)
            .unwrap_or(SessionState::Terminal)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generated_keys_are_hex_and_unique() {
        let a = SessionKey::generate();
        let b = SessionKey::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert!(SessionKey::is_generated(a.as_str()));
    }

    #[test]
    fn test_is_generated_rejects_other_names() {
        assert!(!SessionKey::is_generated("users"));
        assert!(!SessionKey::is_generated("combined"));
        assert!(!SessionKey::is_generated("0123456789ABCDEF0123456789ABCDEF"));
        assert!(!SessionKey::is_generated("0123456789abcdef0123456789abcde"));
    }

    #[test]
    fn test_put_then_get() {
        let store = StagingStore::new();
        let key = SessionKey::from("k1");
        store.put(key.clone(), "/tmp/a.jpg", 7).unwrap();

        assert_eq!(store.get(&key).unwrap(), PathBuf::from("/tmp/a.jpg"));
        assert_eq!(store.state(&key), SessionState::Staged);
        assert_eq!(store.session(&key).unwrap().owner, 7);
    }

    #[test]
    fn test_put_duplicate_key_is_rejected_without_overwrite() {
        let store = StagingStore::new();
        let key = SessionKey::from("dup");
        store.put(key.clone(), "/tmp/first.jpg", 1).unwrap();

        let err = store.put(key.clone(), "/tmp/second.jpg", 2).unwrap_err();
        assert_eq!(err, StoreError::DuplicateKey(key.clone()));
        assert_eq!(store.get(&key).unwrap(), PathBuf::from("/tmp/first.jpg"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_unknown_key_is_not_found() {
        let store = StagingStore::new();
        let key = SessionKey::from("missing");
        assert_eq!(store.get(&key).unwrap_err(), StoreError::NotFound(key.clone()));
        assert_eq!(store.state(&key), SessionState::Terminal);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = StagingStore::new();
        let key = SessionKey::from("gone");
        store.put(key.clone(), "/tmp/x.png", 1).unwrap();

        assert_eq!(store.remove(&key), Some(PathBuf::from("/tmp/x.png")));
        assert_eq!(store.remove(&key), None);
        assert_eq!(store.remove(&SessionKey::from("never-existed")), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_claim_wins_once() {
        let store = StagingStore::new();
        let key = SessionKey::from("race");
        store.put(key.clone(), "/tmp/r.jpg", 1).unwrap();

        assert_eq!(store.claim(&key).unwrap(), PathBuf::from("/tmp/r.jpg"));
        assert_eq!(store.state(&key), SessionState::Uploading);
        assert_eq!(store.claim(&key).unwrap_err(), StoreError::NotFound(key.clone()));
        // still resolvable while the upload runs
        assert!(store.get(&key).is_ok());
    }

    #[test]
    fn test_claim_unknown_key() {
        let store = StagingStore::new();
        assert!(matches!(
            store.claim(&SessionKey::from("nope")),
            Err(StoreError::NotFound(_))
        ));
    }
}
