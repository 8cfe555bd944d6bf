//! Storage backends

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::StorageError;

/// Key-value store holding JSON strings
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Volatile store for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per record inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// Read a record, defaulting when absent
pub(crate) fn load_record<T>(store: &dyn Storage, key: &str) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Corrupted {
            key: key.to_string(),
            source,
        }),
        None => Ok(T::default()),
    }
}

/// Merge `patch`'s top-level fields into the stored record
///
/// An unreadable existing record is replaced by the patch.
pub(crate) fn merge_record<T: Serialize>(
    store: &mut dyn Storage,
    key: &str,
    patch: &T,
) -> Result<(), StorageError> {
    let patch = serde_json::to_value(patch)?;

    let current = store
        .get(key)?
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok());

    let merged = match (current, patch) {
        (Some(Value::Object(mut existing)), Value::Object(fields)) => {
            existing.extend(fields);
            Value::Object(existing)
        }
        (_, patch) => patch,
    };

    store.set(key, &serde_json::to_string(&merged)?)
}

/// Replace a record wholesale
pub(crate) fn write_record<T: Serialize>(
    store: &mut dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    store.set(key, &serde_json::to_string(value)?)
}
