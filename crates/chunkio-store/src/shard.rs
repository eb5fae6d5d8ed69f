//! Shard files
//!
//! Each shard is a flat file of fixed-size slots. Writes go through
//! positional I/O at slot-aligned offsets while the shard's position lock
//! is held; reads are positional and take no position lock, which is safe
//! because a reclaimed slot only becomes visible to readers once the
//! metadata that references it is published, after the slot write
//! completed.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::Path;

use parking_lot::{Mutex, MutexGuard, RwLock};

use chunkio_common::{Error, Result, SLOT_SIZE};

/// One shard file with its write-position state
///
/// The handle lives behind an `Option` so `close` can flush it and release
/// it deterministically; operations arriving after that fail with
/// [`Error::DbClosed`].
pub(crate) struct ShardFile {
    file: RwLock<Option<File>>,
    /// Append position in bytes; always a multiple of the slot size.
    /// Guards all file-position mutations for the shard.
    pos: Mutex<u64>,
}

impl ShardFile {
    /// Open or create the shard file at `path`
    pub(crate) fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file: RwLock::new(Some(file)),
            pos: Mutex::new(len),
        })
    }

    /// Take the shard's position lock
    ///
    /// The guard's value is the current append offset. The caller holds the
    /// guard across slot selection and the slot write, and advances it with
    /// [`advance`](Self::advance) after a successful append.
    pub(crate) fn lock(&self) -> MutexGuard<'_, u64> {
        self.pos.lock()
    }

    /// Advance the append position by one slot after an append write
    pub(crate) fn advance(pos: &mut MutexGuard<'_, u64>) {
        **pos += SLOT_SIZE as u64;
    }

    /// Write one slot at `offset`: the payload, zero-padded to the slot size
    ///
    /// The caller holds the position lock.
    pub(crate) fn write_slot(&self, offset: u64, payload: &[u8]) -> Result<()> {
        let guard = self.file.read();
        let file = guard.as_ref().ok_or(Error::DbClosed)?;
        let mut slot = [0u8; SLOT_SIZE];
        slot[..payload.len()].copy_from_slice(payload);
        file.write_all_at(&slot, offset)?;
        Ok(())
    }

    /// Random read of `size` bytes at `offset`; takes no position lock
    pub(crate) fn read_at(&self, offset: u64, size: usize) -> Result<Vec<u8>> {
        let guard = self.file.read();
        let file = guard.as_ref().ok_or(Error::DbClosed)?;
        let mut data = vec![0u8; size];
        file.read_exact_at(&mut data, offset)?;
        Ok(data)
    }

    /// Flush and close the file, releasing the handle
    ///
    /// The handle is dropped even when the flush fails. Later reads and
    /// writes fail with [`Error::DbClosed`]; a second close is a no-op.
    pub(crate) fn close(&self) -> Result<()> {
        match self.file.write().take() {
            Some(file) => {
                file.sync_all()?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}
