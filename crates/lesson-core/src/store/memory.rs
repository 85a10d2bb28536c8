use std::collections::HashMap;

use crate::types::CollectionKey;

use super::{MarkStore, StoreError};

/// In-process store. An optional quota caps the total payload bytes held,
/// the way browser storage refuses writes once full.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<CollectionKey, String>,
    set_aside: HashMap<CollectionKey, Vec<String>>,
    quota: Option<usize>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }

    /// Number of successful writes, for asserting write-through behaviour.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn get(&self, key: &CollectionKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Payloads moved aside from `key`, oldest first.
    pub fn set_aside_payloads(&self, key: &CollectionKey) -> &[String] {
        self.set_aside.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn used_without(&self, key: &CollectionKey) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| *k != key)
            .map(|(_, v)| v.len())
            .sum()
    }
}

impl MarkStore for MemoryStore {
    fn read(&self, key: &CollectionKey) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &CollectionKey, payload: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota {
            let needed = self.used_without(key) + payload.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }
        self.entries.insert(key.clone(), payload.to_string());
        self.writes += 1;
        Ok(())
    }

    fn set_aside(&mut self, key: &CollectionKey, payload: &str) -> Result<(), StoreError> {
        self.set_aside
            .entry(key.clone())
            .or_default()
            .push(payload.to_string());
        Ok(())
    }
}
