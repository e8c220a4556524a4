//! Partition token extraction.
//!
//! Every partition key starts with a fixed-width token derived from the
//! partitioner hash. The token prefix gives the metadata table its
//! lexicographic ordering and addresses the bloom filter bank.
//!
//! Key format: {token:token_length}{suffix:var}

use crate::error::{KeyTooShortSnafu, Result};

/// Fixed-width token codec bound to a store's configured token length.
///
/// Pure functions of their input; no side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCodec {
    token_length: usize,
}

impl TokenCodec {
    /// Creates a codec for the given token width.
    pub fn new(token_length: usize) -> Self {
        Self { token_length }
    }

    /// Returns the configured token width in bytes.
    pub fn token_length(&self) -> usize {
        self.token_length
    }

    /// Extracts the leading token from a partition key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyTooShort`](crate::Error::KeyTooShort) if the key
    /// carries fewer than `token_length` bytes.
    pub fn token<'a>(&self, key: &'a [u8]) -> Result<&'a [u8]> {
        if key.len() < self.token_length {
            return KeyTooShortSnafu { length: key.len(), token_length: self.token_length }.fail();
        }
        Ok(&key[..self.token_length])
    }
}
