//! Storage module for persisting harvested texts
//!
//! The storage layer is a write-only sink: it creates the `texts` table once
//! and inserts one row per successfully extracted detail page. Rows are never
//! updated, deleted or read back by the harvester itself.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{StorageError, StorageResult, TextSink};

use crate::crawler::ExtractedText;

/// How [`SqliteStorage::open`] treats the database path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateMode {
    /// Create a fresh database file; fail if anything already exists at the path
    #[default]
    CreateNew,

    /// Open a database file that must already exist
    OpenExisting,
}

/// A text as stored in the `texts` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {
    /// Identifier assigned by the remote site
    pub id: i64,
    /// Full text content
    pub text: String,
    /// Category label, stored in the `type` column
    pub text_type: String,
    pub author: String,
    pub source: String,
}

impl TextRecord {
    /// Attaches an identifier to the fields pulled from its detail page
    pub fn from_extracted(id: i64, extracted: ExtractedText) -> Self {
        Self {
            id,
            text: extracted.text,
            text_type: extracted.text_type,
            author: extracted.author,
            source: extracted.source,
        }
    }
}
