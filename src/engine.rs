//! redb storage engine wrapper.
//!
//! Provides a thin wrapper around redb with:
//! - Database lifecycle management
//! - Convenient constructors

use std::path::Path;
use std::sync::Arc;

use redb::backends::InMemoryBackend;
use redb::Database;
use snafu::Snafu;

/// Error context for engine lifecycle operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EngineError {
    /// Database could not be opened or created.
    #[snafu(display("failed to open database at {path}: {source}"))]
    Open {
        /// Path of the database file (`:memory:` for in-memory engines).
        path: String,
        /// The underlying open/create error.
        source: redb::DatabaseError,
    },
}

/// Storage engine backed by redb.
///
/// Wraps a redb [`Database`] behind an [`Arc`] so the handle can be shared
/// between a store facade and its component tables.
pub struct StorageEngine {
    db: Arc<Database>,
}

#[allow(clippy::result_large_err)]
impl StorageEngine {
    /// Open or create a database file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Open`] if the file cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> std::result::Result<Self, EngineError> {
        let path = path.as_ref();
        let db = if path.exists() { Database::open(path) } else { Database::create(path) }
            .map_err(|e| EngineError::Open { path: path.display().to_string(), source: e })?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Create a new in-memory database for testing and benchmarking.
    ///
    /// All data is lost when the last handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Open`] if the backend cannot be created.
    pub fn open_in_memory() -> std::result::Result<Self, EngineError> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(|e| EngineError::Open { path: ":memory:".to_string(), source: e })?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a clone of the database handle.
    pub fn db(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }
}

impl Clone for StorageEngine {
    fn clone(&self) -> Self {
        Self { db: Arc::clone(&self.db) }
    }
}
