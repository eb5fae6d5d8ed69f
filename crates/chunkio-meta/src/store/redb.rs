//! Redb-backed metadata store
//!
//! Persists the address mapping and the free set in a single ordered redb
//! table using the prefix key schema from [`crate::keys`]. Each mutating
//! call runs in its own write transaction, which is the atomic batch the
//! contract requires. A meta cache and an offset cache front the database
//! for read acceleration; either can be disabled at construction.

use std::path::Path;

use parking_lot::RwLock;
use redb::{Database, TableDefinition};
use tracing::debug;

use chunkio_common::{Address, Error, Result};

use crate::cache::MetaCache;
use crate::keys;
use crate::offsets::OffsetCache;
use crate::record::Meta;
use crate::store::MetaStore;

/// Chunk and free-set records, in one keyspace so free-set keys stay
/// ordered by shard then offset
const META: TableDefinition<&[u8], &[u8]> = TableDefinition::new("meta");

const EMPTY_VALUE: &[u8] = &[];

/// Construction options for [`RedbMetaStore`]
#[derive(Clone, Copy, Debug)]
pub struct RedbMetaStoreOptions {
    /// Keep an in-memory address → meta map in front of the database
    pub meta_cache: bool,
    /// Keep in-memory per-shard free-offset sets in front of the database
    pub offset_cache: bool,
}

impl Default for RedbMetaStoreOptions {
    fn default() -> Self {
        Self {
            meta_cache: true,
            offset_cache: true,
        }
    }
}

/// Metadata store backed by an embedded redb database
///
/// The database handle lives behind an `Option` so `close` can release it
/// deterministically; operations arriving after that fail with
/// [`Error::DbClosed`].
pub struct RedbMetaStore {
    db: RwLock<Option<Database>>,
    meta_cache: Option<MetaCache>,
    free_cache: Option<OffsetCache>,
}

impl RedbMetaStore {
    /// Open (or create) the database at `path` with both caches enabled
    pub fn open(path: impl AsRef<Path>, shard_count: u8) -> Result<Self> {
        Self::with_options(path, shard_count, RedbMetaStoreOptions::default())
    }

    /// Open (or create) the database at `path`
    pub fn with_options(
        path: impl AsRef<Path>,
        shard_count: u8,
        options: RedbMetaStoreOptions,
    ) -> Result<Self> {
        let db = Database::create(path.as_ref())?;

        // Ensure the table exists so read transactions can open it
        let wtx = db.begin_write()?;
        wtx.open_table(META)?;
        wtx.commit()?;

        debug!(
            "opened redb meta store at {:?} (meta_cache: {}, offset_cache: {})",
            path.as_ref(),
            options.meta_cache,
            options.offset_cache
        );

        Ok(Self {
            db: RwLock::new(Some(db)),
            meta_cache: options.meta_cache.then(MetaCache::new),
            free_cache: options
                .offset_cache
                .then(|| OffsetCache::new(shard_count)),
        })
    }

    fn read_meta(&self, db: &Database, addr: &Address) -> Result<Meta> {
        let rtx = db.begin_read()?;
        let table = rtx.open_table(META)?;
        let key = keys::chunk_key(addr);
        let value = table.get(key.as_slice())?.ok_or(Error::ChunkNotFound)?;
        Meta::from_bytes(value.value())
    }
}

impl MetaStore for RedbMetaStore {
    fn get(&self, addr: &Address) -> Result<Meta> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(Error::DbClosed)?;

        if let Some(cache) = &self.meta_cache {
            if let Some(meta) = cache.get(addr.as_bytes()) {
                return Ok(meta);
            }
        }
        let meta = self.read_meta(db, addr)?;
        if let Some(cache) = &self.meta_cache {
            cache.set(addr.as_bytes(), meta);
        }
        Ok(meta)
    }

    fn has(&self, addr: &Address) -> Result<bool> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(Error::DbClosed)?;

        if let Some(cache) = &self.meta_cache {
            if cache.has(addr.as_bytes()) {
                return Ok(true);
            }
        }
        let rtx = db.begin_read()?;
        let table = rtx.open_table(META)?;
        let key = keys::chunk_key(addr);
        Ok(table.get(key.as_slice())?.is_some())
    }

    fn put(&self, addr: &Address, shard: u8, reclaimed: bool, meta: Meta) -> Result<()> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(Error::DbClosed)?;

        let wtx = db.begin_write()?;
        {
            let mut table = wtx.open_table(META)?;
            if reclaimed {
                table.remove(keys::free_key(shard, meta.offset).as_slice())?;
            }
            table.insert(keys::chunk_key(addr).as_slice(), meta.to_bytes().as_slice())?;
        }
        wtx.commit()?;

        if reclaimed {
            if let Some(cache) = &self.free_cache {
                cache.delete(shard, meta.offset);
            }
        }
        if let Some(cache) = &self.meta_cache {
            cache.set(addr.as_bytes(), meta);
        }
        Ok(())
    }

    fn free(&self, shard: u8) -> Result<Option<i64>> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(Error::DbClosed)?;

        if let Some(cache) = &self.free_cache {
            if let Some(offset) = cache.get(shard) {
                return Ok(Some(offset));
            }
        }

        let rtx = db.begin_read()?;
        let table = rtx.open_table(META)?;
        let prefix = keys::free_scan_prefix(shard);
        let mut range = table.range(prefix.as_slice()..)?;
        let Some(entry) = range.next() else {
            return Ok(None);
        };
        let (key, _) = entry?;
        let Some(offset) = keys::decode_free_key(key.value(), shard) else {
            return Ok(None);
        };
        if let Some(cache) = &self.free_cache {
            cache.set(shard, offset);
        }
        Ok(Some(offset))
    }

    fn delete(&self, addr: &Address, shard: u8) -> Result<()> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(Error::DbClosed)?;

        let meta = match self.meta_cache.as_ref().and_then(|c| c.get(addr.as_bytes())) {
            Some(meta) => meta,
            None => self.read_meta(db, addr)?,
        };

        let wtx = db.begin_write()?;
        {
            let mut table = wtx.open_table(META)?;
            table.insert(keys::free_key(shard, meta.offset).as_slice(), EMPTY_VALUE)?;
            table.remove(keys::chunk_key(addr).as_slice())?;
        }
        wtx.commit()?;

        if let Some(cache) = &self.free_cache {
            cache.set(shard, meta.offset);
        }
        if let Some(cache) = &self.meta_cache {
            cache.delete(addr.as_bytes());
        }
        Ok(())
    }

    /// Release the database handle
    ///
    /// Every transaction commits durably on its own, so there is nothing
    /// left to flush; dropping the handle releases the backing file for
    /// other openers. Later calls fail with `DbClosed`; a second close is
    /// a no-op.
    fn close(&self) -> Result<()> {
        drop(self.db.write().take());
        Ok(())
    }
}
