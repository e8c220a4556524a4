//! Table definitions for redb storage.
//!
//! The store uses a single metadata table; key encoding is handled by the
//! token module and value encoding by the deletion module.

use redb::TableDefinition;

/// Table definitions for partition metadata storage.
pub struct Tables;

impl Tables {
    /// Partition metadata: partition key → deletion marker (or raw record).
    ///
    /// Key format: {token:token_length}{suffix:var}
    /// Value format: 12-byte big-endian `PartitionDeletion` for the
    /// tombstone path; verbatim bytes for the raw ingest path.
    pub const PARTITION_META: TableDefinition<'static, &'static [u8], &'static [u8]> =
        TableDefinition::new("partition_meta");
}

#[cfg(test)]
mod tests {
    use super::*;
    use redb::TableHandle;

    #[test]
    fn test_partition_meta_table_name() {
        assert_eq!(Tables::PARTITION_META.name(), "partition_meta");
    }
}
