//! Partition metadata store facade.
//!
//! Coordinates the token codec, tombstone table, bloom filter bank, and
//! raw ingest path behind one handle. One store instance fronts one
//! metadata column family; token width and bloom sizing are fixed at
//! construction.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use redb::{Database, ReadableTable};
use snafu::ResultExt;

use crate::bloom::{FilterBank, TokenFilter};
use crate::config::MetaStoreConfig;
use crate::deletion::PartitionDeletion;
use crate::error::{ClosedSnafu, CommitSnafu, Result, StorageSnafu, TableSnafu, TransactionSnafu};
use crate::ingest::RawIngest;
use crate::tables::Tables;
use crate::token::TokenCodec;
use crate::tombstone::TombstoneTable;

/// Point-in-time counters for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaStoreStats {
    /// Number of records in the metadata table (tombstones and raw).
    pub records: u64,
    /// Whether the bloom filter bank has been enabled.
    pub bloom_enabled: bool,
    /// Configured bloom bit budget.
    pub bloom_total_bits: usize,
    /// Bits currently set in the bloom filter (0 while disabled).
    pub bloom_set_bits: u64,
}

/// Partition-level metadata store with bloom-filter-accelerated tombstone
/// tracking.
///
/// # Concurrency
///
/// All operations are synchronous and may block on storage I/O. The
/// store is `Send + Sync`; share it behind an [`Arc`]. Deletes for the
/// same partition key serialize through the engine's single-writer
/// transactions; deletes for different keys are independent.
/// [`apply_raw`](Self::apply_raw) is unordered with respect to
/// [`delete_partition`](Self::delete_partition) on the same key: the
/// last committed transaction wins, which is implementation-defined
/// behavior, not a guarantee.
pub struct PartitionMetaStore {
    db: Arc<Database>,
    config: MetaStoreConfig,
    codec: TokenCodec,
    tombstones: TombstoneTable,
    ingest: RawIngest,
    bloom: FilterBank,
    closed: AtomicBool,
}

impl PartitionMetaStore {
    /// Creates a store over an already-open database handle.
    ///
    /// Validates the configuration and creates the metadata table up
    /// front, so no later operation can observe a missing table or a
    /// partially constructed store.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for out-of-range configuration, or a
    /// storage error variant if the table cannot be created.
    pub fn new(db: Arc<Database>, config: MetaStoreConfig) -> Result<Self> {
        config.validate()?;

        let txn = db.begin_write().context(TransactionSnafu)?;
        txn.open_table(Tables::PARTITION_META).context(TableSnafu)?;
        txn.commit().context(CommitSnafu)?;

        Ok(Self {
            codec: TokenCodec::new(config.token_length),
            tombstones: TombstoneTable::new(Arc::clone(&db)),
            ingest: RawIngest::new(Arc::clone(&db)),
            bloom: FilterBank::new(config.bloom_total_bits),
            closed: AtomicBool::new(false),
            config,
            db,
        })
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &MetaStoreConfig {
        &self.config
    }

    /// Activates the bloom-filter-backed fast path for delete lookups.
    ///
    /// Idempotent. Enabling allocates an empty filter: tombstones written
    /// before this call are not backfilled, so a reopened store should
    /// use [`rebuild_bloom_filter`](Self::rebuild_bloom_filter) instead
    /// to preserve the no-false-negative guarantee.
    ///
    /// # Errors
    ///
    /// Returns `Closed` if the store has been closed.
    pub fn enable_bloom_filter(&self) -> Result<()> {
        self.ensure_open()?;
        if self.bloom.enable() {
            tracing::debug!(total_bits = self.config.bloom_total_bits, "bloom filter enabled");
        }
        Ok(())
    }

    /// Records a partition deletion marker.
    ///
    /// Applies the supersession rule against any existing marker; a stale
    /// marker is a no-op. On a superseding write the partition token is
    /// recorded in the bloom filter bank, after the write has committed.
    ///
    /// # Errors
    ///
    /// Returns `Closed` on a closed store, `KeyTooShort` if the key
    /// carries fewer than `token_length` bytes (no state change), or a
    /// storage error variant if the engine fails.
    pub fn delete_partition(
        &self,
        key: &[u8],
        local_deletion_time: u32,
        marked_for_delete_at: i64,
    ) -> Result<()> {
        self.ensure_open()?;
        let token = self.codec.token(key)?;

        let deletion = PartitionDeletion::new(local_deletion_time, marked_for_delete_at);
        let written = self.tombstones.upsert(key, deletion)?;
        if written {
            self.bloom.record(token);
        }
        Ok(())
    }

    /// Writes a precomputed metadata record verbatim (streaming ingest).
    ///
    /// No supersession check, no token validation, no bloom interaction;
    /// last write wins per key.
    ///
    /// # Errors
    ///
    /// Returns `Closed` on a closed store or a storage error variant if
    /// the engine fails.
    pub fn apply_raw(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.ensure_open()?;
        self.ingest.apply(key, value)
    }

    /// Writes a batch of precomputed records in a single transaction.
    /// Either the whole batch commits or none of it does.
    pub fn apply_raw_batch(&self, records: &[(Vec<u8>, Vec<u8>)]) -> Result<()> {
        self.ensure_open()?;
        self.ingest.apply_batch(records)
    }

    /// Reads a raw metadata record back verbatim.
    pub fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.ensure_open()?;
        self.ingest.get(key)
    }

    /// Returns the current deletion marker for a partition, if any.
    ///
    /// When the bloom bank is enabled, a definite negative on the
    /// partition token skips the storage read entirely; a positive falls
    /// through to the authoritative tombstone table.
    ///
    /// # Errors
    ///
    /// Returns `Closed` on a closed store, `KeyTooShort` for a
    /// sub-token-length key, `Corrupted` if the stored value does not
    /// decode, or a storage error variant if the engine fails.
    pub fn partition_delete(&self, key: &[u8]) -> Result<Option<PartitionDeletion>> {
        self.ensure_open()?;
        let token = self.codec.token(key)?;

        if !self.bloom.may_have_delete(token) {
            return Ok(None);
        }
        self.tombstones.lookup(key)
    }

    /// Returns whether a recorded deletion supersedes the given write
    /// timestamp.
    ///
    /// True iff a marker exists for the partition and its
    /// `marked_for_delete_at` is strictly greater than
    /// `timestamp_micros`. Grace-period arithmetic is the caller's
    /// responsibility.
    ///
    /// # Errors
    ///
    /// Same as [`partition_delete`](Self::partition_delete).
    pub fn deleted_since(&self, key: &[u8], timestamp_micros: i64) -> Result<bool> {
        Ok(self
            .partition_delete(key)?
            .is_some_and(|deletion| deletion.marked_for_delete_at > timestamp_micros))
    }

    /// Returns whether the bloom filter bank might hold a delete for the
    /// key's partition.
    ///
    /// Always `true` while the bank is disabled or degenerate. A `true`
    /// result means "maybe": only the tombstone table is authoritative.
    ///
    /// # Errors
    ///
    /// Returns `Closed` on a closed store or `KeyTooShort` for a
    /// sub-token-length key.
    pub fn might_have_delete(&self, key: &[u8]) -> Result<bool> {
        self.ensure_open()?;
        let token = self.codec.token(key)?;
        Ok(self.bloom.may_have_delete(token))
    }

    /// Enables the bloom filter bank and repopulates it from a full scan
    /// of the metadata table.
    ///
    /// Returns the number of tokens recorded. This is the recovery path
    /// for reopened stores: filter state is volatile and is never rebuilt
    /// automatically. Keys shorter than the token width (possible via
    /// [`apply_raw`](Self::apply_raw)) are skipped. Deletes committed
    /// concurrently with the scan survive the swap.
    ///
    /// # Errors
    ///
    /// Returns `Closed` on a closed store or a storage error variant if
    /// the scan fails.
    pub fn rebuild_bloom_filter(&self) -> Result<u64> {
        self.ensure_open()?;

        if self.config.bloom_total_bits == 0 {
            self.bloom.enable();
            return Ok(0);
        }

        let fresh = TokenFilter::new(self.config.bloom_total_bits);
        let token_length = self.codec.token_length();
        let mut recorded = 0u64;

        let txn = self.db.begin_read().context(TransactionSnafu)?;
        let table = txn.open_table(Tables::PARTITION_META).context(TableSnafu)?;
        for entry in table.iter().context(StorageSnafu)? {
            let (key, _) = entry.context(StorageSnafu)?;
            let key_bytes = key.value();
            if key_bytes.len() < token_length {
                continue;
            }
            fresh.insert(&key_bytes[..token_length]);
            recorded += 1;
        }

        self.bloom.install(fresh);
        tracing::info!(tokens = recorded, "bloom filter rebuilt from metadata scan");
        Ok(recorded)
    }

    /// Returns point-in-time counters for the store.
    pub fn stats(&self) -> Result<MetaStoreStats> {
        self.ensure_open()?;
        Ok(MetaStoreStats {
            records: self.tombstones.len()?,
            bloom_enabled: self.bloom.is_enabled(),
            bloom_total_bits: self.config.bloom_total_bits,
            bloom_set_bits: self.bloom.set_bits().unwrap_or(0),
        })
    }

    /// Marks the store closed. Idempotent.
    ///
    /// Subsequent operations fail with `Closed`. The underlying database
    /// handle is released when the last clone of its `Arc` drops.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("partition metadata store closed");
        }
    }

    /// Returns whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return ClosedSnafu.fail();
        }
        Ok(())
    }
}
