//! Journal repository for database operations on journal metrics

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::DatabaseError;
use crate::models::journal::{Journal, NewJournal};

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const JOURNAL_COLUMNS: &str = "issn_l, display_name, issn_print, issn_online, impact_factor, works_count, cited_by_count, h_index";

/// Lowercase a journal name, turn punctuation into spaces and collapse runs
/// of whitespace.
///
/// Case folding is ASCII-only to agree with SQLite's `LOWER()`.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_ascii_lowercase();
    let spaced = NON_WORD.replace_all(&lowered, " ");
    WHITESPACE.replace_all(spaced.trim(), " ").into_owned()
}

/// Repository for Journal operations
pub struct JournalRepo<'a> {
    conn: &'a Connection,
}

impl<'a> JournalRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert or fully replace the journal keyed by `issn_l`.
    ///
    /// The impact factor is derived from the counts on every write.
    pub fn upsert(&self, journal: &NewJournal) -> Result<Journal, DatabaseError> {
        if journal.issn_l.trim().is_empty() {
            return Err(DatabaseError::InvalidRecord(
                "journal is missing its linking ISSN".to_string(),
            ));
        }

        let record = Journal::from_new(journal);
        self.conn.execute(
            "INSERT OR REPLACE INTO journals (
                issn_l, display_name, issn_print, issn_online,
                impact_factor, works_count, cited_by_count, h_index
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.issn_l,
                record.display_name,
                record.issn_print,
                record.issn_online,
                record.impact_factor,
                record.works_count,
                record.cited_by_count,
                record.h_index,
            ],
        )?;
        Ok(record)
    }

    /// Find a journal by its linking, print or online ISSN.
    ///
    /// A match on the linking ISSN wins over an alternate-key match.
    pub fn get_by_identifier(&self, id: Option<&str>) -> Result<Option<Journal>, DatabaseError> {
        let id = match id {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(None),
        };

        let sql = format!(
            "SELECT {} FROM journals
             WHERE issn_l = ?1 OR issn_print = ?1 OR issn_online = ?1
             ORDER BY issn_l = ?1 DESC
             LIMIT 1",
            JOURNAL_COLUMNS
        );
        let journal = self
            .conn
            .query_row(&sql, [id], |row| self.row_to_journal(row))
            .optional()?;
        Ok(journal)
    }

    /// Find a journal by display name.
    ///
    /// An exact match ignoring ASCII case is preferred. Otherwise the journal
    /// with the highest impact factor whose name contains the normalized
    /// form of `name` is returned. Non-ASCII letters compare as-is, since
    /// SQLite's `LOWER()` leaves them untouched.
    pub fn get_by_name(&self, name: &str) -> Result<Option<Journal>, DatabaseError> {
        if name.is_empty() {
            return Ok(None);
        }

        let exact_sql = format!(
            "SELECT {} FROM journals WHERE LOWER(display_name) = ?1 ORDER BY issn_l LIMIT 1",
            JOURNAL_COLUMNS
        );
        let exact = self
            .conn
            .query_row(&exact_sql, [name.to_ascii_lowercase()], |row| {
                self.row_to_journal(row)
            })
            .optional()?;
        if exact.is_some() {
            return Ok(exact);
        }

        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return Ok(None);
        }

        let partial_sql = format!(
            "SELECT {} FROM journals
             WHERE instr(LOWER(display_name), ?1) > 0
             ORDER BY impact_factor DESC, issn_l ASC
             LIMIT 1",
            JOURNAL_COLUMNS
        );
        let partial = self
            .conn
            .query_row(&partial_sql, [normalized], |row| self.row_to_journal(row))
            .optional()?;
        Ok(partial)
    }

    pub fn count(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM journals", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_journal(&self, row: &Row) -> rusqlite::Result<Journal> {
        Ok(Journal {
            issn_l: row.get(0)?,
            display_name: row.get(1)?,
            issn_print: row.get(2)?,
            issn_online: row.get(3)?,
            impact_factor: row.get(4)?,
            works_count: row.get(5)?,
            cited_by_count: row.get(6)?,
            h_index: row.get(7)?,
        })
    }
}
