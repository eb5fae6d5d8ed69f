//! Per-shard free-offset cache
//!
//! Tracks slot offsets freed by deletion so a reclaiming put can pick one
//! without consulting the backing index. Membership only: reclamation order
//! is unspecified and `get` may return any element.

use std::collections::HashSet;

use parking_lot::RwLock;

/// Per-shard sets of known free offsets
///
/// Shard indices passed to the accessors must be below the shard count the
/// cache was created with.
pub struct OffsetCache {
    shards: RwLock<Vec<HashSet<i64>>>,
}

impl OffsetCache {
    /// Create a cache for `shard_count` shards
    pub fn new(shard_count: u8) -> Self {
        Self {
            shards: RwLock::new(vec![HashSet::new(); shard_count as usize]),
        }
    }

    /// Return any free offset in the shard, or `None` if there is none
    pub fn get(&self, shard: u8) -> Option<i64> {
        self.shards.read()[shard as usize].iter().next().copied()
    }

    /// Insert a free offset; idempotent
    pub fn set(&self, shard: u8, offset: i64) {
        self.shards.write()[shard as usize].insert(offset);
    }

    /// Remove a free offset; no-op if absent
    pub fn delete(&self, shard: u8, offset: i64) {
        self.shards.write()[shard as usize].remove(&offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_empty() {
        let cache = OffsetCache::new(8);
        assert_eq!(cache.get(0), None);
    }

    #[test]
    fn test_offsets_set_get_delete() {
        let cache = OffsetCache::new(8);
        cache.set(3, 4096);
        assert_eq!(cache.get(3), Some(4096));
        // Other shards are unaffected
        assert_eq!(cache.get(2), None);
        cache.delete(3, 4096);
        assert_eq!(cache.get(3), None);
    }

    #[test]
    fn test_offsets_idempotent() {
        let cache = OffsetCache::new(4);
        cache.set(1, 0);
        cache.set(1, 0);
        cache.delete(1, 0);
        assert_eq!(cache.get(1), None);
        cache.delete(1, 0);
    }

    #[test]
    fn test_offsets_returns_some_member() {
        let cache = OffsetCache::new(4);
        cache.set(0, 4096);
        cache.set(0, 8192);
        let got = cache.get(0).unwrap();
        assert!(got == 4096 || got == 8192);
    }
}
