//! Persistent store adapter.
//!
//! A [`Backend`] is a flat string key/value store (the shape of a userscript
//! host's value storage). [`Storage`] layers owner namespacing and native value
//! encoding on top:
//!
//! - key layout: `{prefix}_{owner-len}_{owner}_{field}`; the length segment
//!   pins the owner boundary so ids containing `_` cannot collide;
//! - value encoding: JSON text of the native [`Value`].

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;
use schema::{Schema, Value, Values};
use thiserror::Error;
use tracing::{debug, warn};

/// Failures reading or writing persisted values.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A value or the backing file could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Backend-specific failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Convenient result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Flat, durable string key/value storage.
pub trait Backend: Send + Sync {
    /// Read a raw entry.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    /// Write a raw entry.
    fn set(&self, key: &str, value: String) -> StoreResult<()>;
    /// Remove an entry; removing a missing key is not an error.
    fn delete(&self, key: &str) -> StoreResult<()>;
    /// List every key.
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Write several entries. Backends that can apply a batch atomically
    /// should override this.
    fn set_many(&self, entries: Vec<(String, String)>) -> StoreResult<()> {
        for (k, v) in entries {
            self.set(&k, v)?;
        }
        Ok(())
    }

    /// Remove several entries.
    fn delete_many(&self, keys: &[String]) -> StoreResult<()> {
        for k in keys {
            self.delete(k)?;
        }
        Ok(())
    }
}

/// Process-local backend; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// Stored entries.
    map: Mutex<BTreeMap<String, String>>,
}

impl MemoryBackend {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.map.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> StoreResult<()> {
        self.map.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.map.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.map.lock().keys().cloned().collect())
    }
}

/// Backend persisted to a single JSON object file.
///
/// Every mutation writes the whole object to a sibling temp file and renames
/// it over the original, so a batch either lands completely or not at all and
/// the in-memory view only changes after the write succeeded.
#[derive(Debug)]
pub struct FileBackend {
    /// JSON file holding every entry.
    path: PathBuf,
    /// Entries as last written to `path`.
    map: Mutex<BTreeMap<String, String>>,
}

impl FileBackend {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let map = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        debug!(path = %path.display(), entries = map.len(), "file_store_open");
        Ok(Self {
            path,
            map: Mutex::new(map),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the contents, persist it, then publish it.
    fn mutate<F>(&self, change: F) -> StoreResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut guard = self.map.lock();
        let mut next = guard.clone();
        change(&mut next);
        self.write(&next)?;
        *guard = next;
        Ok(())
    }

    /// Replace the file with `map` via a temp file and rename.
    fn write(&self, map: &BTreeMap<String, String>) -> StoreResult<()> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl Backend for FileBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.map.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> StoreResult<()> {
        self.mutate(|m| {
            m.insert(key.to_string(), value);
        })
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        if !self.map.lock().contains_key(key) {
            return Ok(());
        }
        self.mutate(|m| {
            m.remove(key);
        })
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.map.lock().keys().cloned().collect())
    }

    fn set_many(&self, entries: Vec<(String, String)>) -> StoreResult<()> {
        self.mutate(|m| m.extend(entries))
    }

    fn delete_many(&self, keys: &[String]) -> StoreResult<()> {
        self.mutate(|m| {
            for k in keys {
                m.remove(k);
            }
        })
    }
}

/// Owner-namespaced, natively typed view over a [`Backend`].
#[derive(Clone)]
pub struct Storage {
    /// Where the raw entries live.
    backend: Arc<dyn Backend>,
    /// Leading segment of every key.
    prefix: String,
}

impl Storage {
    /// Wrap `backend`, namespacing every key under `prefix`.
    pub fn new(backend: Arc<dyn Backend>, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    /// Key prefix shared by every entry of `owner`.
    pub fn owner_prefix(&self, owner: &str) -> String {
        format!("{}_{}_{}_", self.prefix, owner.len(), owner)
    }

    /// Backend key of `(owner, field)`.
    pub fn key(&self, owner: &str, field: &str) -> String {
        format!("{}{}", self.owner_prefix(owner), field)
    }

    /// Read the stored value of `(owner, field)`.
    pub fn get(&self, owner: &str, field: &str) -> StoreResult<Option<Value>> {
        match self.backend.get(&self.key(owner, field))? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Write one value.
    pub fn set(&self, owner: &str, field: &str, value: &Value) -> StoreResult<()> {
        let text = serde_json::to_string(value)?;
        self.backend.set(&self.key(owner, field), text)
    }

    /// Write every entry of `values` for `owner` as one batch.
    pub fn save_all(&self, owner: &str, values: &Values) -> StoreResult<()> {
        let mut entries = Vec::with_capacity(values.len());
        for (field, value) in values {
            entries.push((self.key(owner, field), serde_json::to_string(value)?));
        }
        self.backend.set_many(entries)
    }

    /// Every stored entry of `owner`, keyed by field, including entries for
    /// fields the current schema no longer declares. Undecodable entries are
    /// skipped.
    pub fn enumerate(&self, owner: &str) -> StoreResult<Values> {
        let prefix = self.owner_prefix(owner);
        let mut out = Values::new();
        for key in self.backend.keys()? {
            let Some(field) = key.strip_prefix(&prefix) else {
                continue;
            };
            let Some(text) = self.backend.get(&key)? else {
                continue;
            };
            match serde_json::from_str::<Value>(&text) {
                Ok(v) => {
                    out.insert(field.to_string(), v);
                }
                Err(e) => warn!(owner = %owner, key = %field, error = %e, "stored_value_undecodable"),
            }
        }
        Ok(out)
    }

    /// Delete one stored value.
    pub fn delete(&self, owner: &str, field: &str) -> StoreResult<()> {
        self.backend.delete(&self.key(owner, field))
    }

    /// Delete every stored entry of `owner`. Returns how many were removed.
    pub fn clear(&self, owner: &str) -> StoreResult<usize> {
        let prefix = self.owner_prefix(owner);
        let keys: Vec<String> = self
            .backend
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(&prefix))
            .collect();
        if !keys.is_empty() {
            self.backend.delete_many(&keys)?;
        }
        Ok(keys.len())
    }

    /// The effective value of every field of `schema`: the stored value when
    /// present and of the right shape, else the field default.
    ///
    /// Read failures degrade to the default and are logged.
    pub fn resolve(&self, schema: &Schema) -> Values {
        let mut out = Values::new();
        for field in &schema.settings {
            let value = match self.get(&schema.id, &field.key) {
                Ok(Some(v)) if field.kind.accepts(&v) => v,
                Ok(Some(v)) => {
                    warn!(
                        owner = %schema.id,
                        key = %field.key,
                        expected = field.kind.wire_name(),
                        found = v.shape(),
                        "stored_value_shape_mismatch"
                    );
                    field.default.clone()
                }
                Ok(None) => field.default.clone(),
                Err(e) => {
                    warn!(owner = %schema.id, key = %field.key, error = %e, "stored_value_read_failed");
                    field.default.clone()
                }
            };
            out.insert(field.key.clone(), value);
        }
        out
    }
}
