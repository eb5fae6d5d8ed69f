//! Chunkio metadata plane
//!
//! Maps chunk addresses to the slot that holds them and tracks reclaimable
//! slots per shard:
//! - **Record codec**: fixed 10-byte `(offset, size)` encoding
//! - **Meta cache**: in-memory address → meta map fronting the index
//! - **Offset cache**: in-memory per-shard set of known free offsets
//! - **`MetaStore`**: the pluggable index contract the data plane consumes
//! - **Backends**: pure in-memory, and redb-backed with optional caches
//!
//! # Read path
//! 1. Check the meta cache (hit → return)
//! 2. Look up the backing index
//! 3. Populate the cache on miss
//!
//! # Write path
//! Mutations that touch the free set (`put` of a reclaimed slot, `delete`)
//! are applied to the backing index as a single atomic batch; caches are
//! updated write-through.

pub mod cache;
pub mod keys;
pub mod offsets;
pub mod record;
pub mod store;

pub use cache::MetaCache;
pub use offsets::OffsetCache;
pub use record::{Meta, META_RECORD_SIZE};
pub use store::{MemMetaStore, MetaStore, RedbMetaStore, RedbMetaStoreOptions};
