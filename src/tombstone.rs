//! Partition tombstone table.
//!
//! Maps partition keys to their latest deletion marker. Out-of-order
//! delete requests are resolved by the marker supersession rule inside a
//! single write transaction; the engine serializes write transactions, so
//! upserts for the same key never race each other.

use std::sync::Arc;

use redb::{Database, ReadableTable, ReadableTableMetadata};
use snafu::ResultExt;

use crate::deletion::PartitionDeletion;
use crate::error::{CommitSnafu, Error, Result, StorageSnafu, TableSnafu, TransactionSnafu};
use crate::tables::Tables;

/// Ordered store of partition deletion markers.
pub struct TombstoneTable {
    db: Arc<Database>,
}

impl TombstoneTable {
    /// Creates a tombstone table over the given database handle.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Records a deletion marker, applying the supersession rule.
    ///
    /// Reads any existing marker for the key and writes only if the
    /// incoming marker supersedes it; a stale marker leaves the table
    /// unchanged. Returns whether a write occurred, which gates the
    /// caller's bloom filter side effect.
    ///
    /// # Errors
    ///
    /// Returns `Corrupted` if the existing value does not decode as a
    /// marker, or a storage error variant if the engine fails.
    pub fn upsert(&self, key: &[u8], deletion: PartitionDeletion) -> Result<bool> {
        let txn = self.db.begin_write().context(TransactionSnafu)?;
        let written = {
            let mut table = txn.open_table(Tables::PARTITION_META).context(TableSnafu)?;

            // Extract the current marker and drop the borrow before mutation.
            let existing = match table.get(key).context(StorageSnafu)? {
                Some(guard) => Some(decode_marker(guard.value())?),
                None => None,
            };

            match existing {
                Some(current) if !deletion.supersedes(&current) => false,
                _ => {
                    table.insert(key, &deletion.to_bytes()[..]).context(StorageSnafu)?;
                    true
                },
            }
        };
        txn.commit().context(CommitSnafu)?;
        Ok(written)
    }

    /// Returns the current deletion marker for a key, if any.
    ///
    /// # Errors
    ///
    /// Returns `Corrupted` if the stored value does not decode as a
    /// marker, or a storage error variant if the engine fails.
    pub fn lookup(&self, key: &[u8]) -> Result<Option<PartitionDeletion>> {
        let txn = self.db.begin_read().context(TransactionSnafu)?;
        let table = txn.open_table(Tables::PARTITION_META).context(TableSnafu)?;

        match table.get(key).context(StorageSnafu)? {
            Some(guard) => Ok(Some(decode_marker(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Returns the number of records in the metadata table.
    pub fn len(&self) -> Result<u64> {
        let txn = self.db.begin_read().context(TransactionSnafu)?;
        let table = txn.open_table(Tables::PARTITION_META).context(TableSnafu)?;
        table.len().context(StorageSnafu)
    }

    /// Returns whether the metadata table holds no records.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn decode_marker(value: &[u8]) -> Result<PartitionDeletion> {
    PartitionDeletion::from_bytes(value).ok_or_else(|| Error::Corrupted {
        reason: format!("expected {} byte marker, found {} bytes", PartitionDeletion::SIZE, value.len()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::engine::StorageEngine;

    fn create_test_table() -> TombstoneTable {
        let engine = StorageEngine::open_in_memory().expect("open engine");
        let db = engine.db();
        // Create the table up front the way the facade does.
        let txn = db.begin_write().unwrap();
        txn.open_table(Tables::PARTITION_META).unwrap();
        txn.commit().unwrap();
        TombstoneTable::new(db)
    }

    #[test]
    fn test_first_upsert_writes() {
        let table = create_test_table();
        let written = table.upsert(b"01234567partA", PartitionDeletion::new(1000, 5000)).unwrap();
        assert!(written);
        assert_eq!(
            table.lookup(b"01234567partA").unwrap(),
            Some(PartitionDeletion::new(1000, 5000))
        );
    }

    #[test]
    fn test_stale_marker_is_noop() {
        let table = create_test_table();
        table.upsert(b"01234567partA", PartitionDeletion::new(1000, 5000)).unwrap();

        let written = table.upsert(b"01234567partA", PartitionDeletion::new(999, 4000)).unwrap();
        assert!(!written);
        assert_eq!(
            table.lookup(b"01234567partA").unwrap(),
            Some(PartitionDeletion::new(1000, 5000))
        );
    }

    #[test]
    fn test_newer_marker_supersedes() {
        let table = create_test_table();
        table.upsert(b"01234567partA", PartitionDeletion::new(1000, 5000)).unwrap();

        let written = table.upsert(b"01234567partA", PartitionDeletion::new(1001, 6000)).unwrap();
        assert!(written);
        assert_eq!(
            table.lookup(b"01234567partA").unwrap(),
            Some(PartitionDeletion::new(1001, 6000))
        );
    }

    #[test]
    fn test_tie_break_converges_in_either_order() {
        let m1 = PartitionDeletion::new(1000, 5000);
        let m2 = PartitionDeletion::new(1001, 5000);

        let forward = create_test_table();
        forward.upsert(b"key-0001", m1).unwrap();
        forward.upsert(b"key-0001", m2).unwrap();
        assert_eq!(forward.lookup(b"key-0001").unwrap(), Some(m2));

        let reverse = create_test_table();
        reverse.upsert(b"key-0001", m2).unwrap();
        assert!(!reverse.upsert(b"key-0001", m1).unwrap());
        assert_eq!(reverse.lookup(b"key-0001").unwrap(), Some(m2));
    }

    #[test]
    fn test_lookup_missing_key() {
        let table = create_test_table();
        assert_eq!(table.lookup(b"nothing-here").unwrap(), None);
    }

    #[test]
    fn test_keys_are_independent() {
        let table = create_test_table();
        table.upsert(b"aaaaaaaa-1", PartitionDeletion::new(1, 100)).unwrap();
        table.upsert(b"bbbbbbbb-2", PartitionDeletion::new(2, 200)).unwrap();

        assert_eq!(table.lookup(b"aaaaaaaa-1").unwrap(), Some(PartitionDeletion::new(1, 100)));
        assert_eq!(table.lookup(b"bbbbbbbb-2").unwrap(), Some(PartitionDeletion::new(2, 200)));
        assert_eq!(table.len().unwrap(), 2);
    }

    #[test]
    fn test_corrupted_marker_surfaces() {
        let engine = StorageEngine::open_in_memory().expect("open engine");
        let db = engine.db();
        {
            let txn = db.begin_write().unwrap();
            {
                let mut raw = txn.open_table(Tables::PARTITION_META).unwrap();
                raw.insert(&b"badrecord"[..], &b"not a marker"[..]).unwrap();
            }
            txn.commit().unwrap();
        }

        let table = TombstoneTable::new(db);
        assert!(matches!(table.lookup(b"badrecord"), Err(Error::Corrupted { .. })));
        assert!(matches!(
            table.upsert(b"badrecord", PartitionDeletion::new(1, 1)),
            Err(Error::Corrupted { .. })
        ));
    }
}
