//! Configuration types for chunkio

use serde::{Deserialize, Serialize};

/// Shard count used by reference deployments
pub const DEFAULT_SHARD_COUNT: u8 = 32;

/// Store configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Number of shard files the data plane is split across
    ///
    /// Part of the on-disk format: a store must be reopened with the same
    /// shard count it was created with, since the address-to-shard mapping
    /// depends on it.
    pub shard_count: u8,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
        }
    }
}

impl StoreConfig {
    /// Create a config with the given shard count
    pub fn with_shard_count(shard_count: u8) -> Self {
        Self { shard_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shard_count() {
        assert_eq!(StoreConfig::default().shard_count, 32);
    }

    #[test]
    fn test_with_shard_count() {
        assert_eq!(StoreConfig::with_shard_count(8).shard_count, 8);
    }
}
