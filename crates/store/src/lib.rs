//! Session persistence: a lenient loader and a reporting saver over a
//! single-key key-value collaborator.

pub mod schema;

pub use schema::{SavedSession, SavedSlot};

use anyhow::Context;
use scratch_core::{GiftCatalog, Session};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const SESSION_KEY: &str = "scratch_session";

/// Single-writer key-value store, the shape of the page-origin storage the
/// game runs against.
pub trait KeyValue {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

/// Serializes the session aggregate to its backing store. Read failures of
/// any kind are the normal "no prior session" answer and never escape; write
/// failures are reported so the caller can log and keep playing from memory.
pub struct SessionStore<K: KeyValue> {
    kv: K,
    key: String,
}

impl<K: KeyValue> SessionStore<K> {
    pub fn new(kv: K) -> Self {
        Self::with_key(kv, SESSION_KEY)
    }

    pub fn with_key(kv: K, key: &str) -> Self {
        Self {
            kv,
            key: key.to_string(),
        }
    }

    pub fn load(&self, catalog: &GiftCatalog) -> Option<Session> {
        let raw = match self.kv.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                log::debug!("session read failed: {:#}", err);
                return None;
            }
        };
        let saved: SavedSession = match serde_json::from_str(&raw) {
            Ok(saved) => saved,
            Err(err) => {
                log::debug!("discarding malformed session payload: {}", err);
                return None;
            }
        };
        match saved.into_session(catalog) {
            Ok(session) => Some(session),
            Err(err) => {
                log::debug!("discarding invalid session payload: {:#}", err);
                None
            }
        }
    }

    pub fn save(&mut self, session: &Session) -> anyhow::Result<()> {
        let raw = serde_json::to_string(&SavedSession::from_session(session))
            .context("serialize session")?;
        self.kv
            .set(&self.key, &raw)
            .with_context(|| format!("write session key {}", self.key))
    }

    pub fn clear(&mut self) -> anyhow::Result<()> {
        self.kv.remove(&self.key)
    }
}

/// One file per key under a root directory; the store that survives a
/// process restart.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl KeyValue for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        Ok(Some(raw))
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("create {}", self.root.display()))?;
        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("write {}", path.display()))
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
        }
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions. `fail_writes` simulates
/// a quota-exhausted backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValue for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.fail_writes {
            anyhow::bail!("storage quota exceeded");
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

pub fn file_store_at(root: impl AsRef<Path>) -> SessionStore<FileStore> {
    SessionStore::new(FileStore::new(root.as_ref()))
}
