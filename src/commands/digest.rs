//! The `digest` command: top-cited papers for a query followed by recent
//! papers per keyword.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::io::Write;
use tracing::warn;

use crate::adapters::semantic_scholar::{DateRange, SemanticScholarClient};
use crate::services::digest::{
    recent_by_keywords, top_cited, RecentRequest, TopCitedRequest, DAYS_PER_MONTH,
};
use crate::services::impact::ImpactScorer;
use crate::storage::JournalStore;
use crate::utils::format::format_scored_paper;

#[derive(Debug, Clone)]
pub struct DigestOptions {
    pub query: String,
    pub keywords: Vec<String>,
    pub exclude_terms: Vec<String>,
    pub days_back: u32,
    pub months_back: u32,
    pub top_n: usize,
    pub max_results_per_keyword: usize,
    pub max_fetch_top_cited: usize,
    pub display_limit: usize,
    pub fields: Option<String>,
    pub sort_by_impact: bool,
    pub show_impact: bool,
}

impl DigestOptions {
    fn top_cited_request(&self, today: NaiveDate) -> Result<TopCitedRequest> {
        let date_range = self
            .months_back
            .checked_mul(DAYS_PER_MONTH)
            .and_then(|days| DateRange::days_back(today, days))
            .with_context(|| format!("--months-back {} is out of range", self.months_back))?;
        Ok(TopCitedRequest {
            query: self.query.clone(),
            date_range,
            top_n: self.top_n,
            fields: self.fields.clone(),
            max_fetch: self.max_fetch_top_cited,
            exclude_terms: self.exclude_terms.clone(),
        })
    }

    fn recent_request(&self, today: NaiveDate) -> Result<RecentRequest> {
        let date_range = DateRange::days_back(today, self.days_back)
            .with_context(|| format!("--days-back {} is out of range", self.days_back))?;
        Ok(RecentRequest {
            keywords: self.keywords.clone(),
            date_range,
            fields: self.fields.clone(),
            max_results_per_keyword: self.max_results_per_keyword,
            exclude_terms: self.exclude_terms.clone(),
            sort_by_impact: self.sort_by_impact,
            score_impact: self.show_impact,
        })
    }

    fn needs_store(&self) -> bool {
        self.sort_by_impact || self.show_impact
    }
}

/// Open the journal store if the options need one. A store that cannot be
/// opened disables impact features instead of failing the digest.
pub fn open_store_for(options: &DigestOptions, store_path: &std::path::Path) -> Option<JournalStore> {
    if !options.needs_store() {
        return None;
    }
    match JournalStore::open(store_path) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("Journal store unavailable, impact ranking disabled: {}", e);
            None
        }
    }
}

pub async fn run_digest(
    client: &mut SemanticScholarClient,
    store: Option<&JournalStore>,
    options: &DigestOptions,
    today: NaiveDate,
    out: &mut impl Write,
) -> Result<()> {
    let exclude = if options.exclude_terms.is_empty() {
        "None".to_string()
    } else {
        options.exclude_terms.join("/")
    };
    let top_request = options.top_cited_request(today)?;
    let recent_request = options.recent_request(today)?;

    writeln!(
        out,
        "--- Top {} Most Cited {} Papers (Last {} Months, Excluding {}) ---",
        options.top_n, options.query, options.months_back, exclude
    )?;

    let top = top_cited(client, &top_request).await?;
    let scorer = store.filter(|_| options.show_impact).map(ImpactScorer::new);

    for (i, paper) in top.iter().enumerate() {
        let impact = scorer.as_ref().and_then(|s| match s.assess(paper) {
            Ok(impact) => Some(impact),
            Err(e) => {
                warn!("Impact lookup failed: {}", e);
                None
            }
        });
        writeln!(out, "\n{}. {}", i + 1, format_scored_paper(paper, impact.as_ref()))?;
        writeln!(out, "{}", "-".repeat(80))?;
    }

    writeln!(out, "\n{}", "=".repeat(80))?;

    let recent = recent_by_keywords(client, store, &recent_request).await?;
    for results in &recent {
        writeln!(
            out,
            "\nFound {} recent papers for '{}' (after exclusions)",
            results.papers.len(),
            results.keyword
        )?;
        for (i, scored) in results.papers.iter().take(options.display_limit).enumerate() {
            let impact = scored.impact.as_ref().filter(|_| options.show_impact);
            writeln!(out, "\n{}. {}", i + 1, format_scored_paper(&scored.paper, impact))?;
            writeln!(out, "{}", "-".repeat(60))?;
        }
    }

    Ok(())
}
