//! Typed JSON adapter over a raw key/value store.
//!
//! The adapter is the single point where entities are encoded and
//! decoded. Callers supply an optional pre-flight ceiling so oversized
//! payloads fail fast without touching the underlying store; a store
//! that still rejects the write reports the same `QuotaExceeded`
//! signal. The adapter never retries — trim-and-retry is repository
//! policy.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::{EngineError, Result};

use super::keys::{SOFT_TOTAL_CEILING_BYTES, STALE_KEY_PATTERNS};
use super::store::KeyValueStore;

/// Cloneable handle to the session's store.
pub struct StoreAdapter {
    store: Arc<Mutex<dyn KeyValueStore>>,
}

impl Clone for StoreAdapter {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl StoreAdapter {
    pub fn new<S: KeyValueStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, dyn KeyValueStore + 'static>> {
        self.store
            .lock()
            .map_err(|e| EngineError::IoError(format!("store lock poisoned: {e}")))
    }

    /// Read and decode the value under `key`. Absent keys are `Ok(None)`;
    /// malformed payloads are `DecodeError` so callers can fall back to
    /// defaults.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw = match self.lock()?.get(key) {
            Some(raw) => raw,
            None => return Ok(None),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| EngineError::DecodeError(key.to_string(), e.to_string()))
    }

    /// Encode and write `value` under `key`.
    ///
    /// When `ceiling` is given and the encoded size exceeds it, the
    /// write fails with `QuotaExceeded` before the store is touched.
    pub fn write<T: Serialize>(&self, key: &str, value: &T, ceiling: Option<usize>) -> Result<()> {
        let encoded = serde_json::to_string(value)
            .map_err(|e| EngineError::IoError(format!("encode '{key}': {e}")))?;

        if let Some(limit) = ceiling {
            if encoded.len() > limit {
                log::warn!(
                    "payload for '{}' is {} bytes, over the {} byte ceiling",
                    key,
                    encoded.len(),
                    limit
                );
                return Err(EngineError::QuotaExceeded(key.to_string()));
            }
        }

        self.lock()?.set(key, &encoded)
    }

    /// Encoded size of `value` in bytes, as it would be written.
    pub fn encoded_size<T: Serialize>(&self, value: &T) -> Result<usize> {
        serde_json::to_string(value)
            .map(|s| s.len())
            .map_err(|e| EngineError::IoError(format!("encode: {e}")))
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut store) = self.store.lock() {
            store.remove(key);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.store
            .lock()
            .map(|store| store.get(key).is_some())
            .unwrap_or(false)
    }

    pub fn used_bytes(&self) -> usize {
        self.store
            .lock()
            .map(|store| store.used_bytes())
            .unwrap_or(0)
    }

    /// Remove every key containing one of the stale patterns. Returns
    /// the number of keys removed.
    pub fn sweep_stale_keys(&self) -> usize {
        let Ok(mut store) = self.store.lock() else {
            return 0;
        };
        let stale: Vec<String> = store
            .keys()
            .into_iter()
            .filter(|key| STALE_KEY_PATTERNS.iter().any(|p| key.contains(p)))
            .collect();
        for key in &stale {
            store.remove(key);
            log::info!("removed stale key '{key}'");
        }
        stale.len()
    }

    /// Startup maintenance: log current usage and sweep stale keys when
    /// total usage crosses the soft ceiling.
    pub fn maintain(&self) {
        let used = self.used_bytes();
        log::debug!("store usage: {:.2} KB", used as f64 / 1024.0);
        if used > SOFT_TOTAL_CEILING_BYTES {
            log::warn!("store usage over the soft ceiling, sweeping stale keys");
            self.sweep_stale_keys();
        }
    }
}
