//! Generic persisted collection.
//!
//! A repository exclusively owns one ordered in-memory collection and
//! mirrors it into the store under a fixed key. Memory is the source of
//! truth: the stored encoding is a best-effort snapshot, and every
//! failure path degrades to "keep serving from memory" rather than
//! surfacing an error to the caller.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::EngineError;
use crate::storage::StoreAdapter;

/// An entity kind a repository can own.
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// Kind label used in logs and diagnostics.
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// The form written to storage. Defaults to the entity itself;
    /// kinds carrying large inline payloads strip them here while the
    /// in-memory record stays complete.
    fn to_persisted(&self) -> Self {
        self.clone()
    }
}

/// How a snapshot is reduced when it does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimStrategy {
    /// Nothing can be dropped record-wise; an oversized payload drops
    /// the stored key entirely.
    None,
    /// Persist at most the first `n` records (newest-first ordering).
    KeepNewest(usize),
    /// Persist at most the last `n` records.
    KeepLast(usize),
}

impl TrimStrategy {
    fn initial_retention(self, len: usize) -> Option<usize> {
        match self {
            Self::None => None,
            Self::KeepNewest(n) | Self::KeepLast(n) => Some(n.min(len)),
        }
    }

    fn cap<T>(self, items: &mut Vec<T>, keep: usize) {
        match self {
            Self::None => {}
            Self::KeepNewest(_) => items.truncate(keep),
            Self::KeepLast(_) => {
                let excess = items.len().saturating_sub(keep);
                items.drain(..excess);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RepositoryConfig {
    pub key: &'static str,
    /// Pre-flight size ceiling for the encoded payload, if any.
    pub ceiling_bytes: Option<usize>,
    pub strategy: TrimStrategy,
}

impl RepositoryConfig {
    pub fn unbounded(key: &'static str) -> Self {
        Self {
            key,
            ceiling_bytes: None,
            strategy: TrimStrategy::None,
        }
    }
}

pub struct Repository<T: Entity> {
    adapter: StoreAdapter,
    config: RepositoryConfig,
    items: Vec<T>,
    initialized: bool,
}

impl<T: Entity> Repository<T> {
    pub fn new(adapter: StoreAdapter, config: RepositoryConfig) -> Self {
        Self {
            adapter,
            config,
            items: Vec::new(),
            initialized: false,
        }
    }

    pub fn key(&self) -> &'static str {
        self.config.key
    }

    /// Load the collection from the store, falling back to an empty
    /// collection on absence or decode failure.
    pub fn load(&mut self) {
        self.load_or(Vec::new());
    }

    /// Load the collection, falling back to `defaults` when the key is
    /// absent or its payload is malformed. Runs at most once; `persist`
    /// is a no-op until it has run so stored data is never clobbered by
    /// an unloaded default.
    pub fn load_or(&mut self, defaults: Vec<T>) {
        if self.initialized {
            return;
        }
        match self.adapter.read::<Vec<T>>(self.config.key) {
            Ok(Some(items)) => self.items = items,
            Ok(None) => self.items = defaults,
            Err(e) => {
                log::warn!("loading {} failed ({e}); falling back to defaults", T::KIND);
                self.items = defaults;
            }
        }
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Insert at the front (newest-first collections).
    pub fn prepend(&mut self, item: T) {
        self.items.insert(0, item);
        self.persist();
    }

    /// Insert at the back (chronological collections).
    pub fn append(&mut self, item: T) {
        self.items.push(item);
        self.persist();
    }

    /// Apply `f` to the record with the given id. Returns false when no
    /// such record exists; persists only on a hit.
    pub fn update(&mut self, id: &str, f: impl FnOnce(&mut T)) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            return false;
        };
        f(item);
        self.persist();
        true
    }

    /// Apply `f` to every record matching `filter`. Returns the number
    /// of records touched; persists only when that is non-zero.
    pub fn update_where(&mut self, filter: impl Fn(&T) -> bool, mut f: impl FnMut(&mut T)) -> usize {
        let mut touched = 0;
        for item in self.items.iter_mut().filter(|item| filter(item)) {
            f(item);
            touched += 1;
        }
        if touched > 0 {
            self.persist();
        }
        touched
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        let removed = self.items.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.persist();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Serialize the collection and write it to the store, trimming the
    /// snapshot until it fits.
    ///
    /// The written payload is never larger than the configured ceiling;
    /// trimming halves the retained record count until it converges, in
    /// the worst case dropping the stored key while the in-memory
    /// collection stays untouched. A no-op before `load`.
    pub fn persist(&mut self) {
        if !self.initialized {
            return;
        }
        let key = self.config.key;

        let mut snapshot: Vec<T> = self.items.iter().map(Entity::to_persisted).collect();
        let mut retention = self.config.strategy.initial_retention(snapshot.len());
        if let Some(keep) = retention {
            self.config.strategy.cap(&mut snapshot, keep);
        }

        if let Some(limit) = self.config.ceiling_bytes {
            loop {
                let size = match self.adapter.encoded_size(&snapshot) {
                    Ok(size) => size,
                    Err(e) => {
                        log::error!("persisting {} failed: {e}", T::KIND);
                        return;
                    }
                };
                if size <= limit {
                    break;
                }
                match self.halve_retention(&mut snapshot, &mut retention) {
                    Some(()) => {}
                    None => {
                        log::warn!(
                            "{} snapshot cannot fit under {} bytes; dropping stored key '{key}'",
                            T::KIND,
                            limit
                        );
                        self.adapter.remove(key);
                        return;
                    }
                }
            }
        }

        match self.adapter.write(key, &snapshot, self.config.ceiling_bytes) {
            Ok(()) => {}
            Err(EngineError::QuotaExceeded(_)) => {
                // The store itself is full. Free stale keys, halve the
                // retained records, and retry exactly once.
                log::warn!("store rejected '{key}' as oversized, trimming and retrying");
                self.adapter.sweep_stale_keys();
                if self.halve_retention(&mut snapshot, &mut retention).is_none() {
                    self.adapter.remove(key);
                    return;
                }
                if let Err(e) = self.adapter.write(key, &snapshot, self.config.ceiling_bytes) {
                    log::warn!(
                        "retry for '{key}' failed ({e}); keeping {} in memory only",
                        T::KIND
                    );
                    self.adapter.remove(key);
                }
            }
            Err(e) => log::error!("persisting {} failed: {e}", T::KIND),
        }
    }

    /// Halve the retained record count and cap the snapshot. `None`
    /// means nothing further can be dropped (strategy `None`, or the
    /// retention has reached zero).
    fn halve_retention(&self, snapshot: &mut Vec<T>, retention: &mut Option<usize>) -> Option<()> {
        let keep = (*retention)?;
        let halved = keep / 2;
        if halved == 0 {
            return None;
        }
        *retention = Some(halved);
        self.config.strategy.cap(snapshot, halved);
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore, StoreAdapter};
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        id: String,
        payload: String,
    }

    impl Entity for Record {
        const KIND: &'static str = "record";

        fn id(&self) -> &str {
            &self.id
        }
    }

    fn record(id: &str, payload_len: usize) -> Record {
        Record {
            id: id.to_string(),
            payload: "x".repeat(payload_len),
        }
    }

    fn repo(adapter: &StoreAdapter, config: RepositoryConfig) -> Repository<Record> {
        let mut repo = Repository::new(adapter.clone(), config);
        repo.load();
        repo
    }

    #[test]
    fn test_persist_before_load_is_noop() {
        let adapter = StoreAdapter::new(MemoryStore::new());
        adapter.write("records", &vec![record("a", 1)], None).unwrap();

        let mut repo: Repository<Record> =
            Repository::new(adapter.clone(), RepositoryConfig::unbounded("records"));
        repo.persist();

        // The stored collection must survive an unloaded persist.
        let stored: Option<Vec<Record>> = adapter.read("records").unwrap();
        assert_eq!(stored.unwrap().len(), 1);
    }

    #[test]
    fn test_load_falls_back_on_malformed_payload() {
        let mut store = MemoryStore::new();
        store.set("records", "{broken").unwrap();
        let adapter = StoreAdapter::new(store);

        let mut repo: Repository<Record> =
            Repository::new(adapter, RepositoryConfig::unbounded("records"));
        repo.load_or(vec![record("seed", 1)]);
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.items()[0].id, "seed");
    }

    #[test]
    fn test_mutations_roundtrip() {
        let adapter = StoreAdapter::new(MemoryStore::new());
        let mut initial = repo(&adapter, RepositoryConfig::unbounded("records"));

        initial.append(record("a", 4));
        initial.prepend(record("b", 4));
        assert_eq!(initial.items()[0].id, "b");

        assert!(initial.update("a", |r| r.payload = "updated".to_string()));
        assert!(!initial.update("missing", |_| {}));
        assert!(initial.remove("b"));

        let mut reloaded = repo(&adapter, RepositoryConfig::unbounded("records"));
        reloaded.load();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.items()[0].payload, "updated");
    }

    #[test]
    fn test_strategy_caps_written_records_not_memory() {
        let adapter = StoreAdapter::new(MemoryStore::new());
        let mut repo = repo(
            &adapter,
            RepositoryConfig {
                key: "records",
                ceiling_bytes: None,
                strategy: TrimStrategy::KeepNewest(2),
            },
        );
        for i in 0..5 {
            repo.prepend(record(&format!("r{i}"), 2));
        }
        assert_eq!(repo.len(), 5);

        let stored: Vec<Record> = adapter.read("records").unwrap().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].id, "r4");
        assert_eq!(stored[1].id, "r3");
    }

    #[test]
    fn test_oversized_snapshot_is_trimmed_under_ceiling() {
        let adapter = StoreAdapter::new(MemoryStore::new());
        let mut repo = repo(
            &adapter,
            RepositoryConfig {
                key: "records",
                ceiling_bytes: Some(300),
                strategy: TrimStrategy::KeepLast(8),
            },
        );
        for i in 0..8 {
            repo.append(record(&format!("r{i}"), 40));
        }

        let stored: Vec<Record> = adapter.read("records").unwrap().unwrap();
        assert!(!stored.is_empty());
        assert!(stored.len() < 8);
        assert!(adapter.encoded_size(&stored).unwrap() <= 300);
        // Trimming keeps the tail.
        assert_eq!(stored.last().unwrap().id, "r7");
        assert_eq!(repo.len(), 8);
    }

    #[test]
    fn test_unfittable_snapshot_drops_key_and_keeps_memory() {
        let adapter = StoreAdapter::new(MemoryStore::new());
        let mut repo = repo(
            &adapter,
            RepositoryConfig {
                key: "records",
                ceiling_bytes: Some(10),
                strategy: TrimStrategy::None,
            },
        );
        repo.append(record("huge", 64));

        assert!(!adapter.contains("records"));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_store_quota_triggers_halving_retry() {
        // Store capacity fits ~2 records but the ceiling allows more,
        // so the pre-flight passes and the store itself rejects.
        let adapter = StoreAdapter::new(MemoryStore::with_capacity(220));
        let mut repo = repo(
            &adapter,
            RepositoryConfig {
                key: "records",
                ceiling_bytes: Some(4096),
                strategy: TrimStrategy::KeepNewest(8),
            },
        );
        for i in 0..8 {
            repo.prepend(record(&format!("r{i}"), 10));
        }

        assert_eq!(repo.len(), 8);
        if let Some(stored) = adapter.read::<Vec<Record>>("records").unwrap() {
            assert!(stored.len() < 8);
        }
    }
}
