//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the [`TextSink`] trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, TextSink};
use crate::storage::{CreateMode, TextRecord};
use rusqlite::{params, Connection, ErrorCode, OpenFlags};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database file at `path`
    ///
    /// With [`CreateMode::CreateNew`] the file is created atomically, so an
    /// existing file at `path` is reported as [`StorageError::AlreadyExists`]
    /// and left exactly as it was. With [`CreateMode::OpenExisting`] the file
    /// must already be there.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `mode` - Whether to create a new file or open an existing one
    pub fn open(path: &Path, mode: CreateMode) -> StorageResult<Self> {
        let conn = match mode {
            CreateMode::CreateNew => {
                OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(path)
                    .map_err(|e| match e.kind() {
                        io::ErrorKind::AlreadyExists => {
                            StorageError::AlreadyExists(path.to_path_buf())
                        }
                        _ => StorageError::Io(e),
                    })?;
                Connection::open(path)?
            }
            CreateMode::OpenExisting => Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?,
        };

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        tracing::debug!("Opened database at {} ({:?})", path.display(), mode);

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }
}

impl TextSink for SqliteStorage {
    fn create_schema(&mut self) -> StorageResult<()> {
        initialize_schema(&self.conn)?;
        Ok(())
    }

    fn insert(&mut self, record: &TextRecord) -> StorageResult<()> {
        let result = self.conn.execute(
            "INSERT INTO texts (id, text, type, author, source) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.text,
                record.text_type,
                record.author,
                record.source
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StorageError::DuplicateId(record.id))
            }
            Err(e) => Err(e.into()),
        }
    }
}
