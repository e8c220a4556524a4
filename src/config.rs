//! Store configuration.
//!
//! Token length and bloom sizing are bound at construction and immutable
//! for the store's lifetime.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum supported token length in bytes.
///
/// Partition tokens are partitioner-derived hashes; anything beyond this
/// indicates a mis-encoded key rather than a real token.
pub const MAX_TOKEN_LENGTH: usize = 1024;

/// Maximum supported bloom filter size in bits (128 GiB of filter memory).
pub const MAX_BLOOM_TOTAL_BITS: usize = 1 << 40;

/// Partition metadata store configuration.
///
/// # Validation Rules
///
/// - `token_length` must be 1..=[`MAX_TOKEN_LENGTH`]
/// - `bloom_total_bits` must be <= [`MAX_BLOOM_TOTAL_BITS`] (0 is legal and
///   leaves the bloom fast path permanently degenerate)
///
/// # Example
///
/// ```no_run
/// # use partmeta::MetaStoreConfig;
/// let config = MetaStoreConfig::builder()
///     .token_length(8)
///     .bloom_total_bits(1024)
///     .build()
///     .expect("valid metadata store config");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaStoreConfig {
    /// Fixed width of the partition token prefix, in bytes.
    ///
    /// Every key handled by the tombstone path must carry at least this
    /// many leading bytes.
    #[serde(default = "default_token_length")]
    pub token_length: usize,
    /// Total bit budget for the bloom filter bank, shared across all
    /// partitions. 0 disables the fast path.
    #[serde(default)]
    pub bloom_total_bits: usize,
}

#[bon::bon]
impl MetaStoreConfig {
    /// Creates a new store configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if:
    /// - `token_length` is 0 or exceeds [`MAX_TOKEN_LENGTH`]
    /// - `bloom_total_bits` exceeds [`MAX_BLOOM_TOTAL_BITS`]
    #[builder]
    pub fn new(
        #[builder(default = default_token_length())] token_length: usize,
        #[builder(default)] bloom_total_bits: usize,
    ) -> Result<Self> {
        let config = Self { token_length, bloom_total_bits };
        config.validate()?;
        Ok(config)
    }
}

impl MetaStoreConfig {
    /// Validates the configuration values.
    ///
    /// Call after deserialization to ensure values are within valid ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if any value is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.token_length == 0 || self.token_length > MAX_TOKEN_LENGTH {
            return Err(Error::InvalidConfig {
                message: format!(
                    "token_length must be 1-{}, got {}",
                    MAX_TOKEN_LENGTH, self.token_length
                ),
            });
        }
        if self.bloom_total_bits > MAX_BLOOM_TOTAL_BITS {
            return Err(Error::InvalidConfig {
                message: format!(
                    "bloom_total_bits must be <= {}, got {}",
                    MAX_BLOOM_TOTAL_BITS, self.bloom_total_bits
                ),
            });
        }
        Ok(())
    }
}

impl Default for MetaStoreConfig {
    fn default() -> Self {
        Self { token_length: default_token_length(), bloom_total_bits: 0 }
    }
}

fn default_token_length() -> usize {
    8 // Murmur3 partitioner tokens are 8-byte longs
}
