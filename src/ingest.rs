//! Raw metadata ingest for streaming and bulk-load scenarios.
//!
//! Writes precomputed metadata records verbatim, bypassing the tombstone
//! supersession check: the caller has already resolved marker ordering
//! upstream (e.g. when bootstrapping from a snapshot). Last write wins
//! per key. Nothing here touches the bloom filter bank; after a bulk
//! load, callers repopulate it with a rebuild scan.

use std::sync::Arc;

use redb::{Database, ReadableTable};
use snafu::ResultExt;

use crate::error::{CommitSnafu, Result, StorageSnafu, TableSnafu, TransactionSnafu};
use crate::tables::Tables;

/// Unconditional writer for precomputed partition metadata records.
pub struct RawIngest {
    db: Arc<Database>,
}

impl RawIngest {
    /// Creates a raw ingest path over the given database handle.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Writes one record verbatim, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns a storage error variant if the engine fails.
    pub fn apply(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let txn = self.db.begin_write().context(TransactionSnafu)?;
        {
            let mut table = txn.open_table(Tables::PARTITION_META).context(TableSnafu)?;
            table.insert(key, value).context(StorageSnafu)?;
        }
        txn.commit().context(CommitSnafu)?;
        Ok(())
    }

    /// Writes a batch of records in a single transaction.
    ///
    /// Either the whole batch commits or none of it does.
    ///
    /// # Errors
    ///
    /// Returns a storage error variant if the engine fails; on error no
    /// record of the batch is visible.
    pub fn apply_batch(&self, records: &[(Vec<u8>, Vec<u8>)]) -> Result<()> {
        let txn = self.db.begin_write().context(TransactionSnafu)?;
        {
            let mut table = txn.open_table(Tables::PARTITION_META).context(TableSnafu)?;
            for (key, value) in records {
                table.insert(&key[..], &value[..]).context(StorageSnafu)?;
            }
        }
        txn.commit().context(CommitSnafu)?;
        Ok(())
    }

    /// Reads a record back verbatim.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let txn = self.db.begin_read().context(TransactionSnafu)?;
        let table = txn.open_table(Tables::PARTITION_META).context(TableSnafu)?;
        Ok(table.get(key).context(StorageSnafu)?.map(|guard| guard.value().to_vec()))
    }
}
