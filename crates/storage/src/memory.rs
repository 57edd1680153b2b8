//! In-memory key/value store.
//!
//! Clones share the same map, the way every page of an origin sees the same
//! browser storage object. An optional byte quota turns oversized writes into
//! [`Error::QuotaExceeded`].

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::{
    error::{Error, Result},
    traits::KeyValueStore,
};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store limited to `quota` bytes of keys plus values.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Arc::default(),
            quota: Some(quota),
        }
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Drop every entry, like a session ending.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        if let Some(quota) = self.quota {
            let current: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = current + key.len() + value.len();
            if needed > quota {
                return Err(Error::QuotaExceeded { needed, quota });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn put_then_get() {
        let store = MemoryStore::new();
        store.put("app", "{}").unwrap();
        assert_eq!(store.get("app").unwrap().as_deref(), Some("{}"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.put("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn quota_rejects_oversized_write() {
        let store = MemoryStore::with_quota(10);
        store.put("ab", "cdef").unwrap();
        let err = store.put("xy", "0123456").unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded {
            needed: 15,
            quota: 10
        }));
        assert_eq!(store.get("xy").unwrap(), None);
    }

    #[test]
    fn quota_counts_overwrite_once() {
        let store = MemoryStore::with_quota(10);
        store.put("ab", "12345678").unwrap();
        store.put("ab", "87654321").unwrap();
        assert_eq!(store.used_bytes(), 10);
    }

    #[test]
    fn clear_empties_store() {
        let store = MemoryStore::new();
        store.put("k", "v").unwrap();
        store.clear();
        assert_eq!(store.len().unwrap(), 0);
    }
}
