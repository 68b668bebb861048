//! Single-paper lookup command

use anyhow::Result;
use std::io::Write;

use crate::adapters::semantic_scholar::SemanticScholarClient;
use crate::services::impact::ImpactScorer;
use crate::storage::JournalStore;
use crate::utils::format::format_scored_paper;

/// Print one paper's details, with its impact score when a store is given.
///
/// Returns whether the paper was found.
pub async fn show_paper(
    client: &mut SemanticScholarClient,
    store: Option<&JournalStore>,
    paper_id: &str,
    fields: Option<&str>,
    out: &mut impl Write,
) -> Result<bool> {
    let Some(paper) = client.paper_details(paper_id, fields).await? else {
        writeln!(out, "Paper '{}' not found", paper_id)?;
        return Ok(false);
    };

    let impact = match store {
        Some(store) => Some(ImpactScorer::new(store).assess(&paper)?),
        None => None,
    };
    writeln!(out, "{}", format_scored_paper(&paper, impact.as_ref()))?;
    Ok(true)
}
