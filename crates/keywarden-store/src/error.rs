// ABOUTME: The store-wide error enum covering validation, lookup, and persistence failures.
// ABOUTME: Validation variants abort an operation before any row is touched.

use keywarden_core::KeyId;
use thiserror::Error;

use crate::snapshot::SnapshotError;

/// Errors that can occur during inventory store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("buyer name must not be empty")]
    EmptyBuyer,

    #[error("price must be a finite, non-negative number")]
    InvalidPrice,

    #[error("no key with id {0}")]
    KeyNotFound(KeyId),

    #[error("unknown key: {0}")]
    UnknownKey(String),

    #[error("key text must not be empty")]
    EmptyKey,

    #[error("key already sold: {0}")]
    KeyNotAvailable(String),

    #[error("key already exists: {0}")]
    DuplicateKey(String),

    #[error("name must not be empty")]
    EmptyName,

    #[error("category already exists: {0}")]
    DuplicateCategory(String),

    #[error("category not found: {0}")]
    CategoryNotFound(String),

    #[error("the default category cannot be deleted or renamed")]
    SentinelCategory,

    #[error("channel already exists: {0}")]
    DuplicateChannel(String),

    #[error("channel not found: {0}")]
    ChannelNotFound(String),
}
