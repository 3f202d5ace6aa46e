use std::collections::HashMap;

use crate::core::{EngineError, Result};

/// Default capacity of an in-memory store, roughly what browsers grant
/// a single origin.
pub const DEFAULT_CAPACITY_BYTES: usize = 10 * 1024 * 1024;

/// A string key/value byte store with a hard capacity ceiling.
///
/// This is the only storage primitive the engine relies on. `set`
/// reports capacity exhaustion as `QuotaExceeded`; it never partially
/// writes. Usage is accounted as the sum of key and value lengths.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    /// Fails with `QuotaExceeded` when the write would push total
    /// usage past the capacity; the previous value is left intact.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str);

    fn keys(&self) -> Vec<String>;

    /// Total bytes currently accounted against the capacity.
    fn used_bytes(&self) -> usize;

    fn capacity_bytes(&self) -> usize;
}

/// HashMap-backed store. The default backend for tests and for hosts
/// that supply their own durability.
pub struct MemoryStore {
    entries: HashMap<String, String>,
    capacity_bytes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY_BYTES)
    }

    pub fn with_capacity(capacity_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity_bytes,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let replaced = self.entries.get(key).map(|v| v.len() + key.len()).unwrap_or(0);
        let prospective = self.used_bytes() - replaced + key.len() + value.len();
        if prospective > self.capacity_bytes {
            return Err(EngineError::QuotaExceeded(key.to_string()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_roundtrip() {
        let mut store = MemoryStore::new();
        store.set("cases", "[]").unwrap();
        assert_eq!(store.get("cases").as_deref(), Some("[]"));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_set_rejects_over_capacity() {
        let mut store = MemoryStore::with_capacity(16);
        let err = store.set("key", "0123456789abcdef").unwrap_err();
        assert!(matches!(err, EngineError::QuotaExceeded(_)));
        assert_eq!(store.get("key"), None);
    }

    #[test]
    fn test_replacing_value_frees_old_usage() {
        let mut store = MemoryStore::with_capacity(20);
        store.set("k", "0123456789").unwrap();
        // Replacing with an equally sized value must not double-count.
        store.set("k", "abcdefghij").unwrap();
        assert_eq!(store.used_bytes(), 11);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = MemoryStore::new();
        store.set("k", "v").unwrap();
        store.remove("k");
        store.remove("k");
        assert_eq!(store.used_bytes(), 0);
    }
}
