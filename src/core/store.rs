//! Named session persistence over a flat string key-value namespace.
//!
//! Two keys in the namespace are reserved for configuration
//! ([`HOST_ADDRESS_KEY`] and [`SYSTEM_PROMPT_KEY`]); every other key holds a
//! serialized [`Session`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::core::config::io::write_atomically;
use crate::core::error::StoreError;
use crate::core::session::Session;

pub const HOST_ADDRESS_KEY: &str = "host-address";
pub const SYSTEM_PROMPT_KEY: &str = "system-prompt";
pub const RESERVED_KEYS: [&str; 2] = [HOST_ADDRESS_KEY, SYSTEM_PROMPT_KEY];

pub fn is_reserved_key(name: &str) -> bool {
    RESERVED_KEYS.contains(&name)
}

/// Durable string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// A JSON object file holding every key.
///
/// The file is read on every operation and replaced atomically on every
/// write. Two processes sharing the file race with last-write-wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let contents = serde_json::to_vec_pretty(entries).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        write_atomically(&self.path, &contents).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_all()?.into_keys().collect())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries().keys().cloned().collect())
    }
}

pub struct SessionStore {
    backend: Box<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn open_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FileStore::new(path)))
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    pub fn save(&self, name: &str, session: &Session) -> Result<(), StoreError> {
        if name.trim().is_empty() || is_reserved_key(name) {
            return Err(StoreError::InvalidName {
                name: name.to_string(),
            });
        }
        let value = serde_json::to_string(session).map_err(|err| StoreError::Corrupt {
            name: name.to_string(),
            message: err.to_string(),
        })?;
        self.backend.set(name, &value)?;
        debug!(session = %name, turns = session.transcript.len(), "Saved session");
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<Session, StoreError> {
        let not_found = || StoreError::NotFound {
            name: name.to_string(),
        };
        if is_reserved_key(name) {
            return Err(not_found());
        }
        let value = self.backend.get(name)?.ok_or_else(not_found)?;
        serde_json::from_str(&value).map_err(|err| StoreError::Corrupt {
            name: name.to_string(),
            message: err.to_string(),
        })
    }

    /// Remove a saved session. Absent names and reserved keys are left alone.
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        if is_reserved_key(name) {
            return Ok(());
        }
        self.backend.remove(name)?;
        debug!(session = %name, "Deleted session");
        Ok(())
    }

    /// Names of all saved sessions, sorted.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self
            .backend
            .keys()?
            .into_iter()
            .filter(|key| !is_reserved_key(key))
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn host_address(&self) -> Result<Option<String>, StoreError> {
        self.non_empty(HOST_ADDRESS_KEY)
    }

    pub fn set_host_address(&self, host: &str) -> Result<(), StoreError> {
        self.backend.set(HOST_ADDRESS_KEY, host)
    }

    pub fn clear_host_address(&self) -> Result<(), StoreError> {
        self.backend.remove(HOST_ADDRESS_KEY)
    }

    pub fn system_prompt(&self) -> Result<Option<String>, StoreError> {
        self.non_empty(SYSTEM_PROMPT_KEY)
    }

    pub fn set_system_prompt(&self, prompt: &str) -> Result<(), StoreError> {
        self.backend.set(SYSTEM_PROMPT_KEY, prompt)
    }

    pub fn clear_system_prompt(&self) -> Result<(), StoreError> {
        self.backend.remove(SYSTEM_PROMPT_KEY)
    }

    fn non_empty(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .backend
            .get(key)?
            .filter(|value| !value.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ContinuationToken;
    use crate::core::message::Message;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_session() -> Session {
        Session {
            transcript: vec![Message::user("hi"), Message::assistant("**hello**")],
            continuation_token: Some(ContinuationToken::new(json!([1, 2, 3]))),
            system_prompt: "be kind".to_string(),
            model: "llama2".to_string(),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = SessionStore::in_memory();
        let session = sample_session();
        store.save("work", &session).expect("save");
        assert_eq!(store.load("work").expect("load"), session);
    }

    #[test]
    fn list_excludes_reserved_keys_and_sorts() {
        let store = SessionStore::in_memory();
        store.set_host_address("http://box:11434").expect("host");
        store.set_system_prompt("sys").expect("prompt");
        store.save("zeta", &Session::default()).expect("save");
        store.save("alpha", &Session::default()).expect("save");

        assert_eq!(store.list().expect("list"), vec!["alpha", "zeta"]);
    }

    #[test]
    fn reserved_and_empty_names_cannot_be_saved() {
        let store = SessionStore::in_memory();
        for name in [HOST_ADDRESS_KEY, SYSTEM_PROMPT_KEY, "", "   "] {
            assert!(matches!(
                store.save(name, &Session::default()),
                Err(StoreError::InvalidName { .. })
            ));
        }
        assert!(store.host_address().expect("host").is_none());
    }

    #[test]
    fn load_reports_missing_reserved_and_corrupt_entries() {
        let backend = MemoryStore::new();
        backend.set("broken", "{not json").expect("set");
        backend.set(HOST_ADDRESS_KEY, "http://x").expect("set");
        let store = SessionStore::new(Box::new(backend));

        assert!(matches!(
            store.load("missing"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.load(HOST_ADDRESS_KEY),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.load("broken"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn delete_is_a_noop_for_absent_and_reserved_names() {
        let store = SessionStore::in_memory();
        store.set_host_address("http://box").expect("host");
        store.delete("never-saved").expect("absent delete");
        store.delete(HOST_ADDRESS_KEY).expect("reserved delete");
        assert_eq!(
            store.host_address().expect("host"),
            Some("http://box".to_string())
        );

        store.save("gone", &Session::default()).expect("save");
        store.delete("gone").expect("delete");
        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn reserved_accessors_treat_blank_as_unset() {
        let store = SessionStore::in_memory();
        store.set_system_prompt("  ").expect("prompt");
        assert_eq!(store.system_prompt().expect("prompt"), None);
        store.set_system_prompt("You are terse.").expect("prompt");
        assert_eq!(
            store.system_prompt().expect("prompt"),
            Some("You are terse.".to_string())
        );
        store.clear_system_prompt().expect("clear");
        assert_eq!(store.system_prompt().expect("prompt"), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("data").join("sessions.json");

        let first = SessionStore::open_file(&path);
        first.save("chat", &sample_session()).expect("save");
        first.set_host_address("http://gpu:11434").expect("host");

        let second = SessionStore::open_file(&path);
        assert_eq!(second.load("chat").expect("load"), sample_session());
        assert_eq!(
            second.host_address().expect("host"),
            Some("http://gpu:11434".to_string())
        );
        assert_eq!(second.list().expect("list"), vec!["chat"]);

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
        assert!(raw[HOST_ADDRESS_KEY].is_string());
        assert!(raw["chat"].is_string());
    }

    #[test]
    fn file_store_sees_writes_from_other_handles() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("sessions.json");
        let reader = FileStore::new(&path);
        let writer = FileStore::new(&path);

        assert_eq!(reader.get("k").expect("get"), None);
        writer.set("k", "v").expect("set");
        assert_eq!(reader.get("k").expect("get"), Some("v".to_string()));
        writer.remove("k").expect("remove");
        assert!(reader.keys().expect("keys").is_empty());
    }

    #[test]
    fn file_store_reports_unparseable_file() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("sessions.json");
        fs::write(&path, "[1, 2]").expect("write");

        let store = FileStore::new(&path);
        assert!(matches!(store.keys(), Err(StoreError::Parse { .. })));
    }
}
