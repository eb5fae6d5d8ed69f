//! Store coordinator
//!
//! Owns the shard files and the metadata store and binds them with the
//! free-slot protocol:
//!
//! - `put` takes the shard's position lock, chooses a slot (a reclaimed
//!   offset from the free set, or the file end), writes the slot, then
//!   publishes the meta record. For a reclaimed slot the lock is held
//!   across the publication so no concurrent `put` can claim the same
//!   offset from the free set; for an append the offset is unique by
//!   construction and the lock is released before the publication.
//! - `get` resolves the address through the metadata store and reads the
//!   slot positionally, without taking any shard lock.
//! - `delete` marks the shard as possibly-having-free and moves the slot
//!   offset into the free set under the shard lock.
//! - `close` drains in-flight operations with a bounded wait, then closes
//!   each shard file in order and closes the metadata store, releasing
//!   every handle.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, RwLock};
use tracing::{debug, info, warn};

use chunkio_common::{Address, Chunk, Error, Result, StoreConfig, SLOT_SIZE};
use chunkio_meta::{Meta, MetaStore};

use crate::shard::ShardFile;

/// Bounded wait for in-flight operations on close
const CLOSE_TIMEOUT: Duration = Duration::from_secs(15);

/// Content-addressed chunk store over `shard_count` slot files
///
/// Generic over the metadata backend; the trait is monomorphized, not
/// boxed. Clone-free sharing is done by the caller (`Arc<Store<M>>`).
///
/// Callers must not run concurrent operations on the same address; the
/// final state of racing same-address writes is unspecified.
pub struct Store<M> {
    shards: Vec<ShardFile>,
    meta: M,
    shard_count: u8,
    /// Shards whose free set is possibly non-empty. A fast path that
    /// avoids asking the metadata store when the answer is known-empty.
    free_hint: RwLock<HashSet<u8>>,
    closing: AtomicBool,
    in_flight: Mutex<usize>,
    drained: Condvar,
    /// Outcome of the first close, replayed by later calls
    close_state: Mutex<Option<std::result::Result<(), Arc<Error>>>>,
}

impl<M> std::fmt::Debug for Store<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("shard_count", &self.shard_count)
            .finish_non_exhaustive()
    }
}

/// Registration of one in-flight operation; deregisters on drop
struct OpGuard<'a> {
    in_flight: &'a Mutex<usize>,
    drained: &'a Condvar,
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        let mut count = self.in_flight.lock();
        *count -= 1;
        if *count == 0 {
            self.drained.notify_all();
        }
    }
}

impl<M: MetaStore> Store<M> {
    /// Open a store in directory `path`, creating it and the shard files
    /// as needed
    pub fn open(path: impl AsRef<Path>, config: StoreConfig, meta: M) -> Result<Self> {
        if config.shard_count == 0 {
            return Err(Error::configuration("shard_count must be non-zero"));
        }
        let path = path.as_ref();
        fs::create_dir_all(path)?;

        let mut shards = Vec::with_capacity(config.shard_count as usize);
        for i in 0..config.shard_count {
            shards.push(ShardFile::open(path.join(format!("chunks-{i}.db")))?);
        }

        info!(
            "opened chunk store at {:?} ({} shards)",
            path, config.shard_count
        );

        Ok(Self {
            shards,
            meta,
            shard_count: config.shard_count,
            // Every shard starts as possibly-having-free: the metadata
            // store may hold free offsets from a previous run, and a stale
            // entry only costs one `free` call before the hint clears.
            free_hint: RwLock::new((0..config.shard_count).collect()),
            closing: AtomicBool::new(false),
            in_flight: Mutex::new(0),
            drained: Condvar::new(),
            close_state: Mutex::new(None),
        })
    }

    /// Store a chunk
    ///
    /// Writes into a reclaimed slot when the shard has one, otherwise
    /// appends a new slot. On an I/O error after the slot write the
    /// address is indeterminate until a later `has` or `get` resolves it.
    pub fn put(&self, chunk: &Chunk) -> Result<()> {
        let _op = self.protect()?;

        let payload = &chunk.payload;
        if payload.len() > SLOT_SIZE {
            return Err(Error::PayloadTooLarge {
                size: payload.len(),
                max: SLOT_SIZE,
            });
        }
        let shard = self.shard_index(&chunk.address)?;
        let file = &self.shards[shard as usize];

        let has_free = self.free_hint.read().contains(&shard);

        let mut pos = file.lock();
        let (offset, reclaimed) = if has_free {
            match self.meta.free(shard)? {
                Some(free_offset) => {
                    debug!("reusing reclaimed slot {} in shard {}", free_offset, shard);
                    (free_offset as u64, true)
                }
                None => {
                    // The hint was stale; fall back to an append
                    self.free_hint.write().remove(&shard);
                    (*pos, false)
                }
            }
        } else {
            (*pos, false)
        };

        file.write_slot(offset, payload)?;
        if !reclaimed {
            ShardFile::advance(&mut pos);
        }

        let meta = Meta {
            offset: offset as i64,
            size: payload.len() as u16,
        };
        if reclaimed {
            // Hold the position lock until the free-set entry is gone, so
            // no concurrent put can draw the same offset
            let published = self.meta.put(&chunk.address, shard, true, meta);
            drop(pos);
            published
        } else {
            drop(pos);
            self.meta.put(&chunk.address, shard, false, meta)
        }
    }

    /// Retrieve the chunk stored under `addr`
    pub fn get(&self, addr: &Address) -> Result<Chunk> {
        let _op = self.protect()?;

        let shard = self.shard_index(addr)?;
        let meta = self.meta.get(addr)?;
        let payload = self.shards[shard as usize].read_at(meta.offset as u64, meta.size as usize)?;
        Ok(Chunk::new(addr.clone(), payload))
    }

    /// Check whether a chunk is stored under `addr`
    pub fn has(&self, addr: &Address) -> Result<bool> {
        let _op = self.protect()?;

        self.shard_index(addr)?;
        self.meta.has(addr)
    }

    /// Delete the chunk stored under `addr`, freeing its slot for reuse
    pub fn delete(&self, addr: &Address) -> Result<()> {
        let _op = self.protect()?;

        let shard = self.shard_index(addr)?;
        self.free_hint.write().insert(shard);

        let file = &self.shards[shard as usize];
        let _pos = file.lock();
        self.meta.delete(addr, shard)
    }

    /// Shut the store down
    ///
    /// Waits up to 15 seconds for in-flight operations to drain, then
    /// closes every shard file in order and closes the metadata store,
    /// releasing all handles. Only the first call performs the shutdown;
    /// later calls replay the first outcome, error included.
    pub fn close(&self) -> Result<()> {
        let mut state = self.close_state.lock();
        if let Some(outcome) = state.as_ref() {
            return match outcome {
                Ok(()) => Ok(()),
                Err(e) => Err(Error::Shared(Arc::clone(e))),
            };
        }

        self.closing.store(true, Ordering::SeqCst);
        info!("closing chunk store");

        {
            let mut count = self.in_flight.lock();
            let deadline = Instant::now() + CLOSE_TIMEOUT;
            while *count > 0 {
                if self.drained.wait_until(&mut count, deadline).timed_out() {
                    warn!(
                        "close proceeding with {} operations still in flight",
                        *count
                    );
                    break;
                }
            }
        }

        let mut result = Ok(());
        for (i, shard) in self.shards.iter().enumerate() {
            if let Err(e) = shard.close() {
                warn!("failed to close shard {}: {}", i, e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        if let Err(e) = self.meta.close() {
            if result.is_ok() {
                result = Err(e);
            }
        }

        match result {
            Ok(()) => {
                *state = Some(Ok(()));
                Ok(())
            }
            Err(e) => {
                let e = Arc::new(e);
                *state = Some(Err(Arc::clone(&e)));
                Err(Error::Shared(e))
            }
        }
    }

    fn shard_index(&self, addr: &Address) -> Result<u8> {
        addr.shard(self.shard_count).ok_or(Error::InvalidAddress)
    }

    /// Register an in-flight operation, rejecting it when the store is
    /// closing
    fn protect(&self) -> Result<OpGuard<'_>> {
        if self.closing.load(Ordering::SeqCst) {
            return Err(Error::DbClosed);
        }
        *self.in_flight.lock() += 1;
        Ok(OpGuard {
            in_flight: &self.in_flight,
            drained: &self.drained,
        })
    }
}
