//! Database connection management

use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Schema setup failed: {0}")]
    SchemaFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        DatabaseError::QueryFailed(err.to_string())
    }
}

/// Wrapper around SQLite connection
///
/// Dropping the value closes the connection.
pub struct Database {
    pub conn: Connection,
    pub path: PathBuf,
}

/// Open or create the journal database at `path`, creating parent
/// directories and the schema as needed.
pub fn open_database(path: &Path) -> Result<Database, DatabaseError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::ConnectionFailed(format!(
                    "Failed to create directory {:?}: {}",
                    parent, e
                ))
            })?;
        }
    }

    debug!("Opening database at {:?}", path);

    let conn =
        Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    init_schema(&conn)?;

    Ok(Database {
        conn,
        path: path.to_path_buf(),
    })
}

fn init_schema(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(include_str!("schema.sql"))
        .map_err(|e| DatabaseError::SchemaFailed(format!("Failed to create schema: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_new_database() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("journals.db");
        let result = open_database(&path);
        assert!(result.is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journals.db");

        let db = open_database(&path).unwrap();
        db.conn
            .execute(
                "INSERT INTO journals (issn_l, display_name) VALUES ('1234-5678', 'Test')",
                [],
            )
            .unwrap();
        drop(db);

        let db = open_database(&path).unwrap();
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM journals", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
