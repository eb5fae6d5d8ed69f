//! Key schema for KV-backed metadata stores
//!
//! Two namespaces share one ordered keyspace, separated by a prefix byte:
//! - Chunk key: `0x00 || addr`
//! - Free-set key: `0x01 || shard:u8 || offset:u64-big-endian`, empty value
//!
//! Free-set keys sort by shard then offset, so "any free offset in shard s"
//! is answered by seeking to `0x01 || s` and inspecting the first entry.

use chunkio_common::Address;

/// Prefix byte of chunk keys
pub const CHUNK_KEY_PREFIX: u8 = 0x00;
/// Prefix byte of free-set keys
pub const FREE_KEY_PREFIX: u8 = 0x01;
/// Encoded size of a free-set key
pub const FREE_KEY_SIZE: usize = 10;

/// Build the chunk key for an address
pub fn chunk_key(addr: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + addr.len());
    key.push(CHUNK_KEY_PREFIX);
    key.extend_from_slice(addr.as_bytes());
    key
}

/// Build the free-set key for a shard offset
pub fn free_key(shard: u8, offset: i64) -> [u8; FREE_KEY_SIZE] {
    let mut key = [0u8; FREE_KEY_SIZE];
    key[0] = FREE_KEY_PREFIX;
    key[1] = shard;
    key[2..].copy_from_slice(&(offset as u64).to_be_bytes());
    key
}

/// Seek target for scanning the free set of a shard
pub fn free_scan_prefix(shard: u8) -> [u8; 2] {
    [FREE_KEY_PREFIX, shard]
}

/// Decode the offset out of a free-set key, if it belongs to `shard`
///
/// Returns `None` when the key lies outside the shard's free-set range,
/// which ends a prefix scan.
pub fn decode_free_key(key: &[u8], shard: u8) -> Option<i64> {
    if key.len() != FREE_KEY_SIZE || key[0] != FREE_KEY_PREFIX || key[1] != shard {
        return None;
    }
    let mut offset = [0u8; 8];
    offset.copy_from_slice(&key[2..]);
    Some(u64::from_be_bytes(offset) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_key_layout() {
        let addr = Address::new(vec![0xaa, 0xbb]);
        assert_eq!(chunk_key(&addr), vec![0x00, 0xaa, 0xbb]);
    }

    #[test]
    fn test_free_key_layout() {
        let key = free_key(7, 8192);
        assert_eq!(key[0], FREE_KEY_PREFIX);
        assert_eq!(key[1], 7);
        assert_eq!(&key[2..], &8192u64.to_be_bytes());
    }

    #[test]
    fn test_free_keys_sort_by_shard_then_offset() {
        assert!(free_key(1, 4096) < free_key(1, 8192));
        assert!(free_key(1, u32::MAX as i64) < free_key(2, 0));
    }

    #[test]
    fn test_decode_free_key() {
        let key = free_key(3, 12288);
        assert_eq!(decode_free_key(&key, 3), Some(12288));
        // Wrong shard ends the scan
        assert_eq!(decode_free_key(&key, 4), None);
        // Chunk keys are never free-set keys
        let chunk = chunk_key(&Address::new(vec![3u8; 9]));
        assert_eq!(decode_free_key(&chunk, 3), None);
    }
}
