use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::{EngineError, Result};

use super::store::{DEFAULT_CAPACITY_BYTES, KeyValueStore};

const VALUE_EXT: &str = "json";

/// File-backed store: one file per key inside a directory, written
/// atomically via a temp file + rename so a crash mid-write never
/// leaves a torn value behind.
pub struct FileStore {
    root: PathBuf,
    capacity_bytes: usize,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::open_with_capacity(root, DEFAULT_CAPACITY_BYTES)
    }

    pub fn open_with_capacity<P: AsRef<Path>>(root: P, capacity_bytes: usize) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .map_err(|e| EngineError::IoError(format!("create store directory: {e}")))?;
        Ok(Self {
            root,
            capacity_bytes,
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{VALUE_EXT}"))
    }

    fn key_is_valid(key: &str) -> bool {
        !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if !Self::key_is_valid(key) {
            return Err(EngineError::IoError(format!("invalid store key '{key}'")));
        }

        let replaced = self.get(key).map(|v| v.len() + key.len()).unwrap_or(0);
        let prospective = self.used_bytes() - replaced + key.len() + value.len();
        if prospective > self.capacity_bytes {
            return Err(EngineError::QuotaExceeded(key.to_string()));
        }

        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)
            .map_err(|e| EngineError::IoError(format!("create temp file: {e}")))?;
        tmp.write_all(value.as_bytes())
            .map_err(|e| EngineError::IoError(format!("write '{key}': {e}")))?;
        tmp.flush()
            .map_err(|e| EngineError::IoError(format!("flush '{key}': {e}")))?;
        tmp.persist(self.path_for(key))
            .map_err(|e| EngineError::IoError(format!("persist '{key}': {e}")))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }

    fn keys(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXT) {
                    return None;
                }
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .collect()
    }

    fn used_bytes(&self) -> usize {
        self.keys()
            .into_iter()
            .map(|key| {
                let value_len = fs::metadata(self.path_for(&key))
                    .map(|m| m.len() as usize)
                    .unwrap_or(0);
                key.len() + value_len
            })
            .sum()
    }

    fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            store.set("notifications", "[1,2,3]").unwrap();
        }
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("notifications").as_deref(), Some("[1,2,3]"));
        assert_eq!(store.keys(), vec!["notifications".to_string()]);
    }

    #[test]
    fn test_capacity_is_enforced() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open_with_capacity(dir.path(), 10).unwrap();
        let err = store.set("key", "0123456789").unwrap_err();
        assert!(matches!(err, EngineError::QuotaExceeded(_)));
        assert_eq!(store.get("key"), None);
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert!(store.set("../escape", "v").is_err());
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.remove("nothing");
        assert!(store.keys().is_empty());
    }
}
