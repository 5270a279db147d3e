//! Local project store backed by SQLite.
//!
//! The store is the single source of truth for the project list:
//! - Ordered reads (ascending by id), either one-shot or live
//! - Batch insert-or-replace that commits all records or none
//! - Live queries delivered over a watch channel after each commit
//! - Destructive reset when the on-disk schema version differs

mod live;
mod schema;
mod sqlite;

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

pub use live::LiveQuery;
pub use sqlite::ProjectStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Record of the last successful sync for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStamp {
  pub account: String,
  pub synced_at: DateTime<Utc>,
  /// Number of records written by that sync
  pub count: u32,
}

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("could not determine data directory")]
  NoDataDir,

  #[error("failed to create store directory {}: {source}", path.display())]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to open project store at {}: {source}", path.display())]
  Open {
    path: PathBuf,
    #[source]
    source: rusqlite::Error,
  },

  #[error("failed to prepare store schema: {0}")]
  Schema(#[source] rusqlite::Error),

  #[error("store query failed: {0}")]
  Query(#[from] rusqlite::Error),

  #[error("batch write failed, no records were applied: {0}")]
  Write(#[source] rusqlite::Error),

  #[error("invalid timestamp '{0}' in store")]
  BadTimestamp(String),

  #[error("store lock poisoned")]
  Poisoned,

  #[error("store worker failed: {0}")]
  Worker(String),
}
