//! Chunkio Store - content-addressed fixed-size chunk storage
//!
//! The data plane of the store: N append-only shard files holding
//! fixed-size chunk slots, coordinated with a pluggable metadata index.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Store<M>                            │
//! │  shard selection · free-slot protocol · lifecycle       │
//! │        │                          │                     │
//! │  ┌───────────────┐        ┌──────────────────────────┐  │
//! │  │  shard files  │        │  MetaStore (chunkio-meta)│  │
//! │  │  chunks-i.db  │        │  addr → (shard, offset,  │  │
//! │  │  slot writes  │        │  size); per-shard free   │  │
//! │  │  under mutex, │        │  offset set              │  │
//! │  │  pread reads  │        │                          │  │
//! │  └───────────────┘        └──────────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Slots freed by deletion are reclaimed by later puts; shard files never
//! shrink and are never compacted.

mod shard;
mod store;

pub use store::Store;

// Re-exports for callers that only depend on this crate
pub use chunkio_common::{Address, Chunk, Error, Result, StoreConfig, SLOT_SIZE};
pub use chunkio_meta::{MemMetaStore, MetaStore, RedbMetaStore, RedbMetaStoreOptions};
