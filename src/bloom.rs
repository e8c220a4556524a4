//! Bloom filter bank for fast negative tombstone lookups.
//!
//! The bank holds one filter over partition tokens, sized by the store's
//! configured bit budget. A definite negative lets `partition_delete`
//! skip the storage read entirely; a positive is only "maybe" and falls
//! through to the authoritative table.
//!
//! The filter uses double hashing: h_i(x) = h1(x) + i * h2(x) mod m,
//! where h1 and h2 are independent FNV-1a-style hashes of the token.
//! Bits are monotonically set-only, so concurrent inserts need no
//! ordering beyond a relaxed atomic OR.
//!
//! Filter state is volatile. It is neither persisted nor rebuilt on
//! restart; reopen flows repopulate it with an explicit table rescan.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Number of hash functions.
const NUM_HASHES: usize = 5;

/// A space-efficient probabilistic set over partition tokens.
///
/// Supports `insert` and `may_contain`. A negative result is guaranteed
/// correct; a positive result may be a false positive. A filter built
/// with zero bits is degenerate: it records nothing and answers "maybe"
/// for every token.
pub struct TokenFilter {
    words: Vec<AtomicU64>,
    total_bits: u64,
}

impl TokenFilter {
    /// Creates an empty filter with all bits clear.
    pub fn new(total_bits: usize) -> Self {
        let words = (0..total_bits.div_ceil(64)).map(|_| AtomicU64::new(0)).collect();
        Self { words, total_bits: total_bits as u64 }
    }

    /// Returns the filter's total bit budget.
    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    /// Inserts a token into the filter.
    pub fn insert(&self, token: &[u8]) {
        if self.total_bits == 0 {
            return;
        }
        let (h1, h2) = Self::hash_pair(token);
        for i in 0..NUM_HASHES {
            let bit = self.bit_index(h1, h2, i);
            self.words[(bit / 64) as usize].fetch_or(1 << (bit % 64), Ordering::Relaxed);
        }
    }

    /// Tests whether a token might be in the set.
    ///
    /// Returns `false` only if the token is definitely absent. A
    /// zero-bit filter always returns `true`.
    pub fn may_contain(&self, token: &[u8]) -> bool {
        if self.total_bits == 0 {
            return true;
        }
        let (h1, h2) = Self::hash_pair(token);
        for i in 0..NUM_HASHES {
            let bit = self.bit_index(h1, h2, i);
            if self.words[(bit / 64) as usize].load(Ordering::Relaxed) & (1 << (bit % 64)) == 0 {
                return false;
            }
        }
        true
    }

    /// Returns the number of set bits.
    pub fn set_bits(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.load(Ordering::Relaxed).count_ones())).sum()
    }

    /// ORs every bit of `other` into this filter.
    ///
    /// Both filters must share the same bit budget; used when swapping a
    /// freshly rebuilt filter in over a live one so that tokens recorded
    /// during the rebuild scan are not lost.
    pub fn merge_from(&self, other: &TokenFilter) {
        debug_assert_eq!(self.total_bits, other.total_bits);
        for (word, other_word) in self.words.iter().zip(&other.words) {
            word.fetch_or(other_word.load(Ordering::Relaxed), Ordering::Relaxed);
        }
    }

    /// Computes a double-hash pair from a token.
    ///
    /// Two independent FNV-1a-style hashes with distinct offset bases.
    fn hash_pair(token: &[u8]) -> (u64, u64) {
        // Seed 1 (h1): standard FNV offset basis
        let mut h1: u64 = 0xcbf2_9ce4_8422_2325;
        for &b in token {
            h1 ^= u64::from(b);
            h1 = h1.wrapping_mul(0x0100_0000_01b3);
        }

        // Seed 2 (h2): different offset basis for independence
        let mut h2: u64 = 0x6c62_272e_07bb_0142;
        for &b in token {
            h2 ^= u64::from(b);
            h2 = h2.wrapping_mul(0x0100_0000_01b3);
        }

        (h1, h2)
    }

    /// Computes the bit index for the i-th hash function.
    fn bit_index(&self, h1: u64, h2: u64, i: usize) -> u64 {
        h1.wrapping_add((i as u64).wrapping_mul(h2)) % self.total_bits
    }
}

impl std::fmt::Debug for TokenFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenFilter")
            .field("total_bits", &self.total_bits)
            .field("set_bits", &self.set_bits())
            .finish()
    }
}

/// Lazily-enabled bloom filter bank shared across a store's delete paths.
///
/// Until [`enable`](Self::enable) is called the bank is inert: recording
/// is a no-op and every query answers "maybe", so callers always fall
/// through to the authoritative tombstone table.
#[derive(Debug)]
pub struct FilterBank {
    total_bits: usize,
    filter: RwLock<Option<Arc<TokenFilter>>>,
}

impl FilterBank {
    /// Creates a disabled bank with the given bit budget.
    pub fn new(total_bits: usize) -> Self {
        Self { total_bits, filter: RwLock::new(None) }
    }

    /// Allocates the filter (zeroed) on first activation.
    ///
    /// Idempotent; returns whether this call performed the activation.
    pub fn enable(&self) -> bool {
        let mut slot = self.filter.write();
        if slot.is_some() {
            return false;
        }
        *slot = Some(Arc::new(TokenFilter::new(self.total_bits)));
        true
    }

    /// Returns whether the bank has been enabled.
    pub fn is_enabled(&self) -> bool {
        self.filter.read().is_some()
    }

    /// Records a token for a committed delete. No-op while disabled.
    pub fn record(&self, token: &[u8]) {
        if let Some(filter) = self.filter.read().as_ref() {
            filter.insert(token);
        }
    }

    /// Returns whether a delete might be recorded for this token.
    ///
    /// Always `true` while the bank is disabled or degenerate; callers
    /// must treat `true` as "maybe" and consult the tombstone table.
    pub fn may_have_delete(&self, token: &[u8]) -> bool {
        match self.filter.read().as_ref() {
            Some(filter) => filter.may_contain(token),
            None => true,
        }
    }

    /// Installs a freshly populated filter, enabling the bank if needed.
    ///
    /// Any live filter is merged into the fresh one under the write lock,
    /// so deletes recorded concurrently with the rebuild scan survive the
    /// swap.
    pub fn install(&self, fresh: TokenFilter) {
        let mut slot = self.filter.write();
        if let Some(live) = slot.as_ref() {
            fresh.merge_from(live);
        }
        *slot = Some(Arc::new(fresh));
    }

    /// Returns the number of set bits, or `None` while disabled.
    pub fn set_bits(&self) -> Option<u64> {
        self.filter.read().as_ref().map(|f| f.set_bits())
    }
}
