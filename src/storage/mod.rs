pub mod adapter;
pub mod file;
pub mod keys;
pub mod store;

pub use adapter::StoreAdapter;
pub use file::FileStore;
pub use store::{DEFAULT_CAPACITY_BYTES, KeyValueStore, MemoryStore};
