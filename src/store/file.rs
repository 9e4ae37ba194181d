//! JSON-file credential store, the native analog of browser local storage.
//! The whole map is rewritten on every mutation; persistence failures are
//! logged and otherwise ignored so callers keep an infallible surface.

use super::CredentialStore;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`, loading any previously persisted entries.
    /// A missing or unreadable file starts the store empty.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), "discarding corrupt credential file: {err}");
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no credential file yet");
                HashMap::new()
            }
            Err(err) => {
                warn!(path = %path.display(), "failed to read credential file: {err}");
                HashMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!(path = %self.path.display(), "failed to create credential dir: {err}");
                return;
            }
        }

        let serialized = match serde_json::to_string_pretty(entries) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!("failed to encode credential file: {err}");
                return;
            }
        };

        if let Err(err) = std::fs::write(&self.path, serialized) {
            warn!(path = %self.path.display(), "failed to write credential file: {err}");
        }
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn clear(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{TOKEN_KEY, USER_KEY};

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials.json");

        let store = FileStore::open(&path);
        store.set(TOKEN_KEY, "token-abc");
        store.set(USER_KEY, r#"{"cached":true}"#);
        drop(store);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get(TOKEN_KEY), Some("token-abc".to_string()));
        assert_eq!(reopened.get(USER_KEY), Some(r#"{"cached":true}"#.to_string()));
    }

    #[test]
    fn clear_removes_entry_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials.json");

        let store = FileStore::open(&path);
        store.set(TOKEN_KEY, "token-abc");
        store.clear(TOKEN_KEY);
        store.clear(TOKEN_KEY);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get(TOKEN_KEY), None);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").expect("write");

        let store = FileStore::open(&path);
        assert_eq!(store.get(TOKEN_KEY), None);

        store.set(TOKEN_KEY, "fresh");
        assert_eq!(store.get(TOKEN_KEY), Some("fresh".to_string()));
    }
}
