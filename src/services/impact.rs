//! Impact scoring
//!
//! Combines a paper's journal impact factor (looked up in the local journal
//! store) with its citation count into a composite score used for ranking.

use crate::models::{Journal, Paper};
use crate::storage::{DatabaseError, JournalStore};
use tracing::debug;

/// Base score for papers whose journal is not in the store.
pub const UNKNOWN_JOURNAL_SCORE: f64 = 10.0;
/// Cap on the journal part of the score.
pub const MAX_BASE_SCORE: f64 = 100.0;
/// Impact factor to base score multiplier.
pub const IMPACT_SCALE: f64 = 10.0;
/// Cap on the citation part of the score.
pub const MAX_CITATION_BONUS: f64 = 20.0;
/// Bonus points per citation.
pub const CITATION_WEIGHT: f64 = 2.0;

/// A paper's composite score and the journal it was matched to, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactAssessment {
    pub score: f64,
    pub journal: Option<Journal>,
}

/// A paper paired with its impact assessment.
///
/// `impact` is `None` when ranking was skipped or could not be computed.
#[derive(Debug, Clone)]
pub struct ScoredPaper {
    pub paper: Paper,
    pub impact: Option<ImpactAssessment>,
}

impl ScoredPaper {
    pub fn unscored(paper: Paper) -> Self {
        Self {
            paper,
            impact: None,
        }
    }
}

/// Score from an optional journal impact factor and citation count.
///
/// Unknown journals get a fixed base of 10, so a known journal with an
/// impact factor below 1.0 ranks under an unknown one.
pub fn composite_score(impact_factor: Option<f64>, citation_count: Option<u64>) -> f64 {
    let base = match impact_factor {
        Some(impact) => (impact * IMPACT_SCALE).min(MAX_BASE_SCORE),
        None => UNKNOWN_JOURNAL_SCORE,
    };
    let citations = citation_count.unwrap_or(0) as f64;
    let bonus = (citations * CITATION_WEIGHT).min(MAX_CITATION_BONUS);
    base + bonus
}

pub struct ImpactScorer<'a> {
    store: &'a JournalStore,
}

impl<'a> ImpactScorer<'a> {
    pub fn new(store: &'a JournalStore) -> Self {
        Self { store }
    }

    /// Find the paper's journal: by ISSN first, then by venue name.
    pub fn find_journal(&self, paper: &Paper) -> Result<Option<Journal>, DatabaseError> {
        if let Some(issn) = paper.issn() {
            if let Some(journal) = self.store.lookup_by_identifier(Some(&issn))? {
                return Ok(Some(journal));
            }
        }

        match paper.venue.as_deref() {
            Some(venue) if !venue.is_empty() => self.store.lookup_by_name(venue),
            _ => Ok(None),
        }
    }

    pub fn assess(&self, paper: &Paper) -> Result<ImpactAssessment, DatabaseError> {
        let journal = self.find_journal(paper)?;
        let score = composite_score(
            journal.as_ref().map(|j| j.impact_factor),
            paper.citation_count,
        );
        debug!(
            "Impact score {:.1} for '{}' (journal: {})",
            score,
            paper.title.as_deref().unwrap_or("untitled"),
            journal.as_ref().map(|j| j.name()).unwrap_or("unknown")
        );
        Ok(ImpactAssessment { score, journal })
    }

    pub fn score(&self, paper: &Paper) -> Result<f64, DatabaseError> {
        Ok(self.assess(paper)?.score)
    }

    /// Assess every paper, keeping input order.
    pub fn score_all(&self, papers: Vec<Paper>) -> Result<Vec<ScoredPaper>, DatabaseError> {
        papers
            .into_iter()
            .map(|paper| {
                let impact = self.assess(&paper)?;
                Ok(ScoredPaper {
                    paper,
                    impact: Some(impact),
                })
            })
            .collect()
    }

    /// Score every paper and sort by descending score.
    pub fn rank(&self, papers: Vec<Paper>) -> Result<Vec<ScoredPaper>, DatabaseError> {
        let mut scored = self.score_all(papers)?;
        sort_by_impact(&mut scored);
        Ok(scored)
    }
}

/// Stable descending sort by impact score; unscored papers sort as zero.
pub fn sort_by_impact(papers: &mut [ScoredPaper]) {
    papers.sort_by(|a, b| {
        let a = a.impact.as_ref().map_or(0.0, |i| i.score);
        let b = b.impact.as_ref().map_or(0.0, |i| i.score);
        b.total_cmp(&a)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewJournal;
    use serde_json::json;
    use tempfile::{tempdir, TempDir};

    fn store_with_gut() -> (TempDir, JournalStore) {
        let dir = tempdir().unwrap();
        let store = JournalStore::open(dir.path().join("journals.db")).unwrap();
        store
            .upsert(&NewJournal {
                issn_l: "0017-5749".to_string(),
                display_name: Some("Gut".to_string()),
                issn_print: Some("0017-5749".to_string()),
                issn_online: Some("1468-3288".to_string()),
                works_count: 100,
                cited_by_count: 500,
                h_index: 200,
            })
            .unwrap();
        store
            .upsert(&NewJournal {
                issn_l: "1000-0001".to_string(),
                display_name: Some("Quiet Letters".to_string()),
                works_count: 1000,
                cited_by_count: 1000,
                ..Default::default()
            })
            .unwrap();
        (dir, store)
    }

    fn paper(value: serde_json::Value) -> Paper {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_composite_score_bounds() {
        assert_eq!(composite_score(None, None), 10.0);
        assert_eq!(composite_score(None, Some(3)), 16.0);
        assert_eq!(composite_score(None, Some(1_000)), 30.0);
        assert_eq!(composite_score(Some(25.0), Some(1_000)), 120.0);
        assert_eq!(composite_score(Some(0.0), None), 0.0);
        // Known low-impact journals fall below the unknown floor.
        assert!(composite_score(Some(0.5), None) < composite_score(None, None));

        for impact in [None, Some(0.0), Some(0.3), Some(4.2), Some(50.0)] {
            for citations in [None, Some(0), Some(1), Some(9), Some(10_000)] {
                let score = composite_score(impact, citations);
                assert!((0.0..=120.0).contains(&score));
                if impact.is_none() {
                    assert!((10.0..=30.0).contains(&score));
                }
            }
        }
    }

    #[test]
    fn test_score_by_issn() {
        let (_dir, store) = store_with_gut();
        let scorer = ImpactScorer::new(&store);

        let p = paper(json!({
            "title": "Matched by ISSN",
            "citationCount": 5,
            "venue": "Some Other Venue",
            "externalIds": {"ISSN": "1468-3288"}
        }));
        let assessment = scorer.assess(&p).unwrap();
        assert_eq!(assessment.score, 20.0);
        assert_eq!(assessment.journal.unwrap().issn_l, "0017-5749");

        let lower = paper(json!({"citationCount": 5, "externalIds": {"issn": "0017-5749"}}));
        assert_eq!(scorer.score(&lower).unwrap(), 20.0);
    }

    #[test]
    fn test_score_falls_back_to_venue() {
        let (_dir, store) = store_with_gut();
        let scorer = ImpactScorer::new(&store);

        let p = paper(json!({
            "citationCount": 1,
            "venue": "GUT",
            "externalIds": {"ISSN": "9999-0000"}
        }));
        assert_eq!(scorer.score(&p).unwrap(), 12.0);
    }

    #[test]
    fn test_unknown_journal_scores_floor_plus_bonus() {
        let (_dir, store) = store_with_gut();
        let scorer = ImpactScorer::new(&store);

        let no_venue = paper(json!({"citationCount": 4}));
        assert_eq!(scorer.score(&no_venue).unwrap(), 18.0);

        let unknown = paper(json!({"venue": "Hepatology", "externalIds": {}}));
        let assessment = scorer.assess(&unknown).unwrap();
        assert_eq!(assessment.score, 10.0);
        assert!(assessment.journal.is_none());
    }

    #[test]
    fn test_rank_is_stable_and_descending() {
        let (_dir, store) = store_with_gut();
        let scorer = ImpactScorer::new(&store);

        let papers = vec![
            paper(json!({"paperId": "a", "venue": "Unknown A"})),
            paper(json!({"paperId": "b", "venue": "Gut", "citationCount": 10})),
            paper(json!({"paperId": "c", "venue": "Unknown C"})),
            paper(json!({"paperId": "d", "venue": "Quiet Letters"})),
            paper(json!({"paperId": "e", "citationCount": 1})),
        ];
        let ranked = scorer.rank(papers).unwrap();
        let ids: Vec<_> = ranked
            .iter()
            .map(|s| s.paper.paper_id.clone().unwrap())
            .collect();
        let scores: Vec<_> = ranked.iter().map(|s| s.impact.as_ref().unwrap().score).collect();

        assert_eq!(ids, vec!["b", "e", "a", "c", "d"]);
        assert_eq!(scores, vec![30.0, 12.0, 10.0, 10.0, 2.0]);
    }

    #[test]
    fn test_score_all_keeps_input_order() {
        let (_dir, store) = store_with_gut();
        let scorer = ImpactScorer::new(&store);

        let papers = vec![
            paper(json!({"paperId": "a", "venue": "Quiet Letters"})),
            paper(json!({"paperId": "b", "venue": "Gut"})),
        ];
        let scored = scorer.score_all(papers).unwrap();
        assert_eq!(scored[0].paper.paper_id.as_deref(), Some("a"));
        assert_eq!(scored[0].impact.as_ref().unwrap().score, 2.0);
        assert_eq!(scored[1].impact.as_ref().unwrap().score, 10.0);
    }
}
