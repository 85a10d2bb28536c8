//! Persistence contract: whole-collection read and whole-collection overwrite,
//! addressed by `(subject, lesson, kind)`. Last write wins.

mod file;
mod memory;

use thiserror::Error;

use crate::types::CollectionKey;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("no data directory available")]
    NoDataDir,
    #[error("failed to encode marks: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait MarkStore {
    /// `Ok(None)` when nothing was ever written under `key`.
    fn read(&self, key: &CollectionKey) -> Result<Option<String>, StoreError>;

    fn write(&mut self, key: &CollectionKey, payload: &str) -> Result<(), StoreError>;

    /// Keeps an unreadable payload next to `key` so overwriting `key` loses
    /// nothing. Never replaces an earlier set-aside payload.
    fn set_aside(&mut self, key: &CollectionKey, payload: &str) -> Result<(), StoreError>;
}

impl<S: MarkStore + ?Sized> MarkStore for Box<S> {
    fn read(&self, key: &CollectionKey) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &CollectionKey, payload: &str) -> Result<(), StoreError> {
        (**self).write(key, payload)
    }

    fn set_aside(&mut self, key: &CollectionKey, payload: &str) -> Result<(), StoreError> {
        (**self).set_aside(key, payload)
    }
}
