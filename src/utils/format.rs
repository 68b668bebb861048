//! Plain-text rendering of papers for the digest output

use crate::models::Paper;
use crate::services::impact::ImpactAssessment;

const NOT_AVAILABLE: &str = "N/A";

/// Author lists longer than this are abbreviated to first and last three.
const MAX_LISTED_AUTHORS: usize = 6;

/// Join author names, abbreviating long lists as "A, B, C ... X, Y, Z".
pub fn format_authors(names: &[String]) -> String {
    if names.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    if names.len() <= MAX_LISTED_AUTHORS {
        return names.join(", ");
    }
    format!(
        "{} ... {}",
        names[..3].join(", "),
        names[names.len() - 3..].join(", ")
    )
}

/// Link to the paper: its DOI if known, otherwise its Semantic Scholar page.
pub fn paper_url(paper: &Paper) -> Option<String> {
    if let Some(doi) = paper.doi() {
        return Some(format!("https://doi.org/{}", doi));
    }
    paper
        .paper_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(|id| format!("https://www.semanticscholar.org/paper/{}", id))
}

pub fn format_paper_details(paper: &Paper) -> String {
    let citations = paper
        .citation_count
        .map(|c| c.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let lines = [
        format!("Title: {}", or_na(paper.title.as_deref())),
        format!("Authors: {}", format_authors(&paper.author_names())),
        format!("Journal: {}", or_na(paper.venue.as_deref())),
        format!("Published: {}", or_na(paper.publication_date.as_deref())),
        format!("Citations: {}", citations),
        format!("URL: {}", paper_url(paper).as_deref().unwrap_or(NOT_AVAILABLE)),
        format!("TLDR: {}", or_na(paper.tldr_text())),
    ];
    lines.join("\n    ")
}

/// Details followed by the impact score line, when one was computed.
pub fn format_scored_paper(paper: &Paper, impact: Option<&ImpactAssessment>) -> String {
    let details = format_paper_details(paper);
    match impact {
        Some(impact) => format!("{}\n    {}", details, format_impact(impact)),
        None => details,
    }
}

pub fn format_impact(impact: &ImpactAssessment) -> String {
    match &impact.journal {
        Some(journal) => format!(
            "Impact score: {:.1} (journal: {}, IF {:.3}, h-index {})",
            impact.score,
            journal.name(),
            journal.impact_factor,
            journal.h_index
        ),
        None => format!("Impact score: {:.1} (journal not in cache)", impact.score),
    }
}

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => NOT_AVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Journal;
    use serde_json::json;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Author {}", i)).collect()
    }

    #[test]
    fn test_format_authors() {
        assert_eq!(format_authors(&[]), "N/A");
        assert_eq!(format_authors(&names(2)), "Author 1, Author 2");
        assert_eq!(format_authors(&names(6)).matches(", ").count(), 5);
        assert_eq!(
            format_authors(&names(8)),
            "Author 1, Author 2, Author 3 ... Author 6, Author 7, Author 8"
        );
    }

    #[test]
    fn test_paper_url_prefers_doi() {
        let with_doi: Paper = serde_json::from_value(json!({
            "paperId": "abc",
            "externalIds": {"DOI": "10.1000/xyz"}
        }))
        .unwrap();
        assert_eq!(paper_url(&with_doi).unwrap(), "https://doi.org/10.1000/xyz");

        let without: Paper = serde_json::from_value(json!({"paperId": "abc"})).unwrap();
        assert_eq!(
            paper_url(&without).unwrap(),
            "https://www.semanticscholar.org/paper/abc"
        );
        assert!(paper_url(&Paper::default()).is_none());
    }

    #[test]
    fn test_format_paper_details_defaults() {
        let text = format_paper_details(&Paper::default());
        assert!(text.starts_with("Title: N/A"));
        assert!(text.contains("Authors: N/A"));
        assert!(text.contains("Citations: N/A"));
        assert!(text.contains("URL: N/A"));
        assert!(text.ends_with("TLDR: N/A"));
    }

    #[test]
    fn test_format_scored_paper() {
        let paper: Paper = serde_json::from_value(json!({
            "title": "Risk loci",
            "venue": "Gut",
            "citationCount": 5,
            "tldr": {"text": "Loci found."}
        }))
        .unwrap();
        let impact = ImpactAssessment {
            score: 20.0,
            journal: Some(Journal {
                issn_l: "0017-5749".to_string(),
                display_name: Some("Gut".to_string()),
                issn_print: None,
                issn_online: None,
                impact_factor: 1.0,
                works_count: 100,
                cited_by_count: 500,
                h_index: 7,
            }),
        };

        let text = format_scored_paper(&paper, Some(&impact));
        assert!(text.contains("Citations: 5"));
        assert!(text.contains("TLDR: Loci found."));
        assert!(text.ends_with("Impact score: 20.0 (journal: Gut, IF 1.000, h-index 7)"));

        assert_eq!(format_scored_paper(&paper, None), format_paper_details(&paper));
    }
}
