//! In-memory metadata store

use chunkio_common::{Address, Error, Result};

use crate::cache::MetaCache;
use crate::offsets::OffsetCache;
use crate::record::Meta;
use crate::store::MetaStore;

/// Metadata store held entirely in memory
///
/// The meta cache and offset cache are the store; nothing is persisted.
pub struct MemMetaStore {
    meta: MetaCache,
    free: OffsetCache,
}

impl MemMetaStore {
    /// Create an empty store for `shard_count` shards
    pub fn new(shard_count: u8) -> Self {
        Self {
            meta: MetaCache::new(),
            free: OffsetCache::new(shard_count),
        }
    }
}

impl MetaStore for MemMetaStore {
    fn get(&self, addr: &Address) -> Result<Meta> {
        self.meta.get(addr.as_bytes()).ok_or(Error::ChunkNotFound)
    }

    fn has(&self, addr: &Address) -> Result<bool> {
        Ok(self.meta.has(addr.as_bytes()))
    }

    fn put(&self, addr: &Address, shard: u8, reclaimed: bool, meta: Meta) -> Result<()> {
        self.meta.set(addr.as_bytes(), meta);
        if reclaimed {
            self.free.delete(shard, meta.offset);
        }
        Ok(())
    }

    fn free(&self, shard: u8) -> Result<Option<i64>> {
        Ok(self.free.get(shard))
    }

    fn delete(&self, addr: &Address, shard: u8) -> Result<()> {
        let meta = self.meta.get(addr.as_bytes()).ok_or(Error::ChunkNotFound)?;
        self.meta.delete(addr.as_bytes());
        self.free.set(shard, meta.offset);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(bytes: &[u8]) -> Address {
        Address::new(bytes.to_vec())
    }

    #[test]
    fn test_mem_put_get() {
        let store = MemMetaStore::new(8);
        let meta = Meta {
            offset: 4096,
            size: 10,
        };
        store.put(&addr(b"a"), 1, false, meta).unwrap();
        assert_eq!(store.get(&addr(b"a")).unwrap(), meta);
        assert!(store.has(&addr(b"a")).unwrap());
    }

    #[test]
    fn test_mem_get_missing() {
        let store = MemMetaStore::new(8);
        assert!(store.get(&addr(b"missing")).unwrap_err().is_not_found());
        assert!(!store.has(&addr(b"missing")).unwrap());
    }

    #[test]
    fn test_mem_delete_moves_offset_to_free_set() {
        let store = MemMetaStore::new(8);
        let meta = Meta {
            offset: 8192,
            size: 1,
        };
        store.put(&addr(b"a"), 2, false, meta).unwrap();
        assert_eq!(store.free(2).unwrap(), None);

        store.delete(&addr(b"a"), 2).unwrap();
        assert!(store.get(&addr(b"a")).unwrap_err().is_not_found());
        assert_eq!(store.free(2).unwrap(), Some(8192));
        // free() must not consume the entry
        assert_eq!(store.free(2).unwrap(), Some(8192));
    }

    #[test]
    fn test_mem_reclaimed_put_clears_free_entry() {
        let store = MemMetaStore::new(8);
        let meta = Meta {
            offset: 4096,
            size: 5,
        };
        store.put(&addr(b"a"), 3, false, meta).unwrap();
        store.delete(&addr(b"a"), 3).unwrap();

        store
            .put(
                &addr(b"b"),
                3,
                true,
                Meta {
                    offset: 4096,
                    size: 7,
                },
            )
            .unwrap();
        assert_eq!(store.free(3).unwrap(), None);
        assert_eq!(store.get(&addr(b"b")).unwrap().size, 7);
    }

    #[test]
    fn test_mem_delete_missing() {
        let store = MemMetaStore::new(8);
        assert!(store
            .delete(&addr(b"missing"), 0)
            .unwrap_err()
            .is_not_found());
    }
}
