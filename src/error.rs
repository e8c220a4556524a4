//! Error types for the partition metadata store.

use snafu::Snafu;

/// Result type alias for partition metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during partition metadata operations.
///
/// Construction failures (`InvalidConfig`) are fatal: no store handle is
/// created. `KeyTooShort` and `Closed` are recoverable by the caller
/// (fix the input, reopen the store). The storage variants wrap failures
/// of the underlying engine verbatim; no retry happens inside this crate.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// Invalid construction parameters.
    #[snafu(display("invalid config: {message}"))]
    InvalidConfig {
        /// Description of the validation failure.
        message: String,
    },

    /// Key is shorter than the configured token length.
    #[snafu(display("key too short: {length} bytes (token length {token_length})"))]
    KeyTooShort {
        /// Actual length of the offending key in bytes.
        length: usize,
        /// Token length the store was constructed with.
        token_length: usize,
    },

    /// Operation attempted on a closed store.
    #[snafu(display("partition metadata store is closed"))]
    Closed,

    /// A stored deletion marker failed to decode.
    #[snafu(display("corrupted deletion marker: {reason}"))]
    Corrupted {
        /// Description of what was malformed.
        reason: String,
    },

    /// Storage operation failed in the underlying engine.
    #[snafu(display("storage error: {source}"))]
    Storage {
        /// The underlying storage error.
        source: redb::StorageError,
    },

    /// Table could not be opened.
    #[snafu(display("table error: {source}"))]
    Table {
        /// The underlying table error.
        source: redb::TableError,
    },

    /// Transaction could not be started.
    #[snafu(display("transaction error: {source}"))]
    Transaction {
        /// The underlying transaction error.
        source: redb::TransactionError,
    },

    /// Transaction failed to commit.
    #[snafu(display("commit error: {source}"))]
    Commit {
        /// The underlying commit error.
        source: redb::CommitError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_display() {
        let err = Error::InvalidConfig { message: "token_length must be >= 1".to_string() };
        assert_eq!(format!("{err}"), "invalid config: token_length must be >= 1");
    }

    #[test]
    fn test_key_too_short_display() {
        let err = Error::KeyTooShort { length: 5, token_length: 8 };
        assert_eq!(format!("{err}"), "key too short: 5 bytes (token length 8)");
    }

    #[test]
    fn test_closed_display() {
        assert_eq!(format!("{}", Error::Closed), "partition metadata store is closed");
    }

    #[test]
    fn test_corrupted_display() {
        let err = Error::Corrupted { reason: "marker is 3 bytes".to_string() };
        assert_eq!(format!("{err}"), "corrupted deletion marker: marker is 3 bytes");
    }
}
