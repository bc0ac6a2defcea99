//! Key-value storage port
//!
//! The session controller mirrors its durable values into a string-keyed,
//! string-valued store. The store is advisory: the controller's in-memory
//! values are canonical and the store only speeds up restarts.

pub mod file_store;
pub mod memory_store;

use thiserror::Error;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

/// Key holding the decimal repetition count
pub const COUNT_KEY: &str = "count";
/// Key holding the decimal target
pub const TARGET_KEY: &str = "target";

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    LockPoisoned,
}

/// Synchronous get/set access to a durable key-value store
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
