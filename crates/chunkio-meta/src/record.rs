//! Meta record codec
//!
//! A meta record locates a chunk's live slot: the byte offset of the slot
//! within its shard file and the true payload length (slots are zero-padded,
//! so the length cannot be recovered from the file alone).

use std::fmt;

use chunkio_common::{Error, Result};

/// Encoded size of a meta record: big-endian offset (8 bytes) followed by
/// big-endian size (2 bytes)
pub const META_RECORD_SIZE: usize = 10;

/// Location of a chunk's slot within its shard file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Meta {
    /// Byte offset of the slot; a non-negative multiple of the slot size
    pub offset: i64,
    /// True payload length in bytes
    pub size: u16,
}

impl Meta {
    /// Encode to the fixed 10-byte wire format
    pub fn to_bytes(&self) -> [u8; META_RECORD_SIZE] {
        let mut buf = [0u8; META_RECORD_SIZE];
        buf[..8].copy_from_slice(&(self.offset as u64).to_be_bytes());
        buf[8..].copy_from_slice(&self.size.to_be_bytes());
        buf
    }

    /// Decode from the wire format
    ///
    /// Input shorter than 10 bytes is a corruption signal; the caller
    /// decides how to react.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < META_RECORD_SIZE {
            return Err(Error::CorruptMeta { len: data.len() });
        }
        let mut offset = [0u8; 8];
        offset.copy_from_slice(&data[..8]);
        let mut size = [0u8; 2];
        size.copy_from_slice(&data[8..META_RECORD_SIZE]);
        Ok(Self {
            offset: u64::from_be_bytes(offset) as i64,
            size: u16::from_be_bytes(size),
        })
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{offset: {}, size: {}}}", self.offset, self.size)
    }
}
