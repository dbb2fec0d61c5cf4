// src/storage/mod.rs
mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use thiserror::Error;

use crate::utils::error::EngineError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(#[from] serde_json::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// One durable snapshot slot holding a whole store as a single blob.
///
/// The gallery, the PIN records and the ledger each own one of these and
/// flush through it on every mutation. Implementations are injected at
/// construction so tests can swap the file-backed store for [`MemoryStore`].
pub trait StateStore<T>: Send + Sync {
    /// Reads the current snapshot; `None` means the store was never written.
    fn load(&self) -> StorageResult<Option<T>>;

    /// Replaces the snapshot, durably, before returning.
    fn save(&self, state: &T) -> StorageResult<()>;
}

impl From<StorageError> for EngineError {
    fn from(error: StorageError) -> Self {
        EngineError::Persistence(error.to_string())
    }
}
