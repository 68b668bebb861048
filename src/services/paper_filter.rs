//! Exclusion of papers mentioning unwanted terms

use crate::models::Paper;
use tracing::info;

/// Papers that survived filtering, and how many were dropped.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub papers: Vec<Paper>,
    pub excluded: usize,
}

/// Remove papers whose title or abstract contains any of `exclude_terms`,
/// ignoring case. Blank terms are ignored and order is preserved.
pub fn filter_excluded_terms(papers: Vec<Paper>, exclude_terms: &[String]) -> FilterOutcome {
    let terms: Vec<String> = exclude_terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    if terms.is_empty() {
        return FilterOutcome {
            papers,
            excluded: 0,
        };
    }

    let total = papers.len();
    let kept: Vec<Paper> = papers
        .into_iter()
        .filter(|paper| !mentions_any(paper, &terms))
        .collect();
    let excluded = total - kept.len();

    if excluded > 0 {
        info!(
            "Excluded {} papers containing excluded terms. {} papers remaining.",
            excluded,
            kept.len()
        );
    }

    FilterOutcome {
        papers: kept,
        excluded,
    }
}

fn mentions_any(paper: &Paper, terms: &[String]) -> bool {
    let title = paper.title.as_deref().unwrap_or_default().to_lowercase();
    let summary = paper.r#abstract.as_deref().unwrap_or_default().to_lowercase();
    terms
        .iter()
        .any(|term| title.contains(term.as_str()) || summary.contains(term.as_str()))
}
