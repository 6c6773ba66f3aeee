//! Key-value blob persistence.

mod memory;
mod state;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;
pub use state::{DEFAULT_USER_NAME, PersistedState};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Key not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Synchronous string blob store.
///
/// Implementations can keep blobs in memory, on disk, or in whatever
/// key-value facility the host offers.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait BlobStore: Send + Sync {
    /// Read a blob. Missing keys are [`StorageError::NotFound`].
    fn get(&self, key: &str) -> StorageResult<String>;

    /// Write a blob, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a blob. Missing keys are not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Synchronous string blob store (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait BlobStore {
    /// Read a blob. Missing keys are [`StorageError::NotFound`].
    fn get(&self, key: &str) -> StorageResult<String>;

    /// Write a blob, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a blob. Missing keys are not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}
