//! Database schema definitions
//!
//! This module contains the SQL schema for the harvester database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS texts (
    id INTEGER PRIMARY KEY,
    text TEXT,
    type TEXT,
    author TEXT,
    source TEXT
);
"#;

/// Initializes the database schema
///
/// Safe to call on a database that already has the table.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
