//! Journal cache commands: bulk population and lookup

use anyhow::{Context, Result};
use std::io::Write;

use crate::adapters::openalex::OpenAlexClient;
use crate::models::Journal;
use crate::storage::JournalStore;

pub async fn populate_journals(
    client: &mut OpenAlexClient,
    store: &JournalStore,
    max_journals: usize,
    out: &mut impl Write,
) -> Result<usize> {
    let processed = client
        .populate_journals(store, max_journals)
        .await
        .context("Failed to write journal metrics")?;
    let total = store.count()?;
    writeln!(
        out,
        "Database populated with {} journals ({} stored at {})",
        processed,
        total,
        store.path().display()
    )?;
    Ok(processed)
}

/// Look a journal up by ISSN, falling back to its name.
pub fn find_journal(store: &JournalStore, query: &str) -> Result<Option<Journal>> {
    let query = query.trim();
    if let Some(journal) = store.lookup_by_identifier(Some(query))? {
        return Ok(Some(journal));
    }
    Ok(store.lookup_by_name(query)?)
}

pub fn show_journal(store: &JournalStore, query: &str, out: &mut impl Write) -> Result<bool> {
    let Some(journal) = find_journal(store, query)? else {
        writeln!(out, "No journal found for '{}'", query)?;
        return Ok(false);
    };

    writeln!(out, "Journal: {}", journal.name())?;
    writeln!(out, "    ISSN-L: {}", journal.issn_l)?;
    writeln!(
        out,
        "    ISSN (print/online): {} / {}",
        journal.issn_print.as_deref().unwrap_or("N/A"),
        journal.issn_online.as_deref().unwrap_or("N/A")
    )?;
    writeln!(out, "    Impact factor: {:.3}", journal.impact_factor)?;
    writeln!(out, "    Works: {}", journal.works_count)?;
    writeln!(out, "    Cited by: {}", journal.cited_by_count)?;
    writeln!(out, "    h-index: {}", journal.h_index)?;
    Ok(true)
}
