//! In-memory address → meta cache
//!
//! Fronts a metadata backend to avoid an index lookup on hot reads.
//! Updates are write-through: every put and delete against the backend
//! updates the cache synchronously. Coherence relies on the store-level
//! contract that at most one writer operates on an address at a time.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::record::Meta;

/// Address → meta map guarded by a read-write lock
#[derive(Default)]
pub struct MetaCache {
    map: RwLock<HashMap<Vec<u8>, Meta>>,
}

impl MetaCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the meta record for an address
    pub fn get(&self, addr: &[u8]) -> Option<Meta> {
        self.map.read().get(addr).copied()
    }

    /// Check whether an address is cached
    pub fn has(&self, addr: &[u8]) -> bool {
        self.map.read().contains_key(addr)
    }

    /// Insert or replace the meta record for an address
    pub fn set(&self, addr: &[u8], meta: Meta) {
        self.map.write().insert(addr.to_vec(), meta);
    }

    /// Remove an address; no-op if absent
    pub fn delete(&self, addr: &[u8]) {
        self.map.write().remove(addr);
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_set_get() {
        let cache = MetaCache::new();
        let meta = Meta {
            offset: 4096,
            size: 100,
        };
        assert_eq!(cache.get(b"addr"), None);
        cache.set(b"addr", meta);
        assert_eq!(cache.get(b"addr"), Some(meta));
        assert!(cache.has(b"addr"));
    }

    #[test]
    fn test_cache_overwrite() {
        let cache = MetaCache::new();
        cache.set(b"addr", Meta { offset: 0, size: 1 });
        cache.set(
            b"addr",
            Meta {
                offset: 4096,
                size: 2,
            },
        );
        assert_eq!(cache.get(b"addr").unwrap().offset, 4096);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_delete_idempotent() {
        let cache = MetaCache::new();
        cache.set(b"addr", Meta { offset: 0, size: 1 });
        cache.delete(b"addr");
        assert!(!cache.has(b"addr"));
        cache.delete(b"addr");
        assert!(cache.is_empty());
    }
}
