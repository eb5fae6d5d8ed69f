//! Pluggable metadata index
//!
//! The data plane consumes this contract; backends decide where the index
//! lives. Two implementations are provided: a pure in-memory store for
//! tests and volatile deployments, and a redb-backed store for durable
//! ones.

mod mem;
mod redb;

pub use mem::MemMetaStore;
pub use redb::{RedbMetaStore, RedbMetaStoreOptions};

use chunkio_common::{Address, Result};

use crate::record::Meta;

/// Contract between the store coordinator and the metadata index
///
/// Implementations are internally thread-safe. The free set tracks slot
/// offsets reclaimable per shard; `put` with `reclaimed` set and `delete`
/// mutate it atomically together with the address mapping.
pub trait MetaStore: Send + Sync {
    /// Look up the meta record for an address
    ///
    /// Fails with [`Error::ChunkNotFound`](chunkio_common::Error::ChunkNotFound)
    /// when the address is absent.
    fn get(&self, addr: &Address) -> Result<Meta>;

    /// Check whether an address is present
    fn has(&self, addr: &Address) -> Result<bool>;

    /// Publish the meta record for an address
    ///
    /// When `reclaimed` is true the offset was drawn from the shard's free
    /// set; the free-set entry is removed and the mapping set in a single
    /// atomic batch.
    fn put(&self, addr: &Address, shard: u8, reclaimed: bool, meta: Meta) -> Result<()>;

    /// Return any free offset in the shard's free set, or `None`
    ///
    /// Must not remove the offset; removal happens in the subsequent
    /// `put(.., reclaimed=true, ..)` once the slot has been rewritten.
    fn free(&self, shard: u8) -> Result<Option<i64>>;

    /// Remove an address and move its slot offset into the shard's free set
    ///
    /// Applied as a single atomic batch. Fails with `ChunkNotFound` when
    /// the address is absent.
    fn delete(&self, addr: &Address, shard: u8) -> Result<()>;

    /// Flush and release resources
    fn close(&self) -> Result<()>;
}
