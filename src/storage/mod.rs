//! Storage module for the journal metric cache
//!
//! This module provides:
//! - Database connection management
//! - The journal repository over a borrowed connection
//! - `JournalStore`, which opens a connection per operation

pub mod db;
pub mod journal_repo;

pub use db::{open_database, Database, DatabaseError};
pub use journal_repo::{normalize_name, JournalRepo};

use std::path::{Path, PathBuf};

use crate::models::journal::{Journal, NewJournal};

/// Durable journal metric store located at a file path.
///
/// Each operation opens its own connection and closes it when the operation
/// returns, so no transaction ever spans two operations.
#[derive(Debug, Clone)]
pub struct JournalStore {
    path: PathBuf,
}

impl JournalStore {
    /// Open the store, creating the database file and schema if missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref().to_path_buf();
        open_database(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_repo<T>(
        &self,
        operation: impl FnOnce(&JournalRepo<'_>) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let db = open_database(&self.path)?;
        let repo = JournalRepo::new(&db.conn);
        operation(&repo)
    }

    pub fn upsert(&self, journal: &NewJournal) -> Result<Journal, DatabaseError> {
        self.with_repo(|repo| repo.upsert(journal))
    }

    pub fn lookup_by_identifier(&self, id: Option<&str>) -> Result<Option<Journal>, DatabaseError> {
        if id.map_or(true, str::is_empty) {
            return Ok(None);
        }
        self.with_repo(|repo| repo.get_by_identifier(id))
    }

    pub fn lookup_by_name(&self, name: &str) -> Result<Option<Journal>, DatabaseError> {
        if name.is_empty() {
            return Ok(None);
        }
        self.with_repo(|repo| repo.get_by_name(name))
    }

    pub fn count(&self) -> Result<usize, DatabaseError> {
        self.with_repo(|repo| repo.count())
    }
}
