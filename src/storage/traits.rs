//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::TextRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Text {0} is already stored")]
    DuplicateId(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Write-only sink for harvested texts
pub trait TextSink {
    /// Creates the `texts` table if it does not exist yet
    fn create_schema(&mut self) -> StorageResult<()>;

    /// Inserts a record
    ///
    /// Fails with [`StorageError::DuplicateId`] if a row with the same id is
    /// already present; that row is left untouched.
    fn insert(&mut self, record: &TextRecord) -> StorageResult<()>;
}
