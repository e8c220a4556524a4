//! partmeta: a partition-level metadata store with bloom-filter-accelerated
//! tombstone tracking.
//!
//! The store records partition deletion markers in a dedicated metadata
//! table of an ordered embedded key-value database (redb) and resolves
//! out-of-order deletes with a supersession rule over the marker fields,
//! never arrival order. An optional in-memory bloom filter over partition
//! tokens lets "no delete recorded" lookups short-circuit without touching
//! storage.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           PartitionMetaStore (facade)        │
//! │  (enable / delete / apply_raw / lookup)     │
//! └───────┬───────────┬───────────┬─────────────┘
//!         │           │           │
//! ┌───────▼─────┐ ┌───▼───────┐ ┌─▼───────────┐
//! │ TokenCodec  │ │ FilterBank│ │  RawIngest  │
//! │ (key prefix)│ │  (bloom)  │ │ (streaming) │
//! └─────────────┘ └───────────┘ └─┬───────────┘
//!         ┌─────────────────┐     │
//!         │ TombstoneTable  │◄────┘
//!         │ (supersession)  │
//!         └────────┬────────┘
//!                  │
//!         ┌────────▼────────┐
//!         │  StorageEngine  │
//!         │     (redb)      │
//!         └─────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use partmeta::{MetaStoreConfig, PartitionMetaStore, StorageEngine};
//!
//! let engine = StorageEngine::open_in_memory()?;
//! let config = MetaStoreConfig::builder()
//!     .token_length(8)
//!     .bloom_total_bits(1024)
//!     .build()?;
//! let store = PartitionMetaStore::new(engine.db(), config)?;
//!
//! store.enable_bloom_filter()?;
//! store.delete_partition(b"01234567partA", 1000, 5000)?;
//! assert!(store.partition_delete(b"01234567partA")?.is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod bloom;
mod config;
mod deletion;
mod engine;
mod error;
mod ingest;
mod store;
mod tables;
mod token;
mod tombstone;

pub use bloom::{FilterBank, TokenFilter};
pub use config::{MetaStoreConfig, MAX_BLOOM_TOTAL_BITS, MAX_TOKEN_LENGTH};
pub use deletion::PartitionDeletion;
pub use engine::{EngineError, StorageEngine};
pub use error::{Error, Result};
pub use ingest::RawIngest;
pub use store::{MetaStoreStats, PartitionMetaStore};
pub use tables::Tables;
pub use token::TokenCodec;
pub use tombstone::TombstoneTable;
