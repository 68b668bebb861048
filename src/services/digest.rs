//! Digest workflows: top-cited papers for a query, and recent papers per
//! keyword ranked by journal impact.

use tracing::{info, warn};

use crate::adapters::semantic_scholar::{DateRange, SemanticScholarClient};
use crate::models::Paper;
use crate::services::impact::{sort_by_impact, ImpactScorer, ScoredPaper};
use crate::services::paper_filter::filter_excluded_terms;
use crate::storage::JournalStore;
use crate::utils::http::ApiError;

/// Months are approximated as 30 days for lookback windows.
pub const DAYS_PER_MONTH: u32 = 30;

#[derive(Debug, Clone)]
pub struct TopCitedRequest {
    pub query: String,
    pub date_range: DateRange,
    pub top_n: usize,
    pub fields: Option<String>,
    pub max_fetch: usize,
    pub exclude_terms: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RecentRequest {
    pub keywords: Vec<String>,
    pub date_range: DateRange,
    pub fields: Option<String>,
    pub max_results_per_keyword: usize,
    pub exclude_terms: Vec<String>,
    pub sort_by_impact: bool,
    /// Attach impact assessments even when the order is left alone.
    pub score_impact: bool,
}

/// Papers found for one keyword, after exclusions.
#[derive(Debug, Clone)]
pub struct KeywordResults {
    pub keyword: String,
    pub papers: Vec<ScoredPaper>,
}

/// Stable descending sort by citation count; missing counts sort as zero.
pub fn sort_by_citations(papers: &mut [Paper]) {
    papers.sort_by(|a, b| {
        b.citation_count
            .unwrap_or(0)
            .cmp(&a.citation_count.unwrap_or(0))
    });
}

/// The `top_n` most cited papers for a query within a date range.
pub async fn top_cited(
    client: &mut SemanticScholarClient,
    request: &TopCitedRequest,
) -> Result<Vec<Paper>, ApiError> {
    info!(
        "Fetching papers for '{}' from {} to {} to find top {} most cited",
        request.query, request.date_range.start, request.date_range.end, request.top_n
    );

    let fetched = client
        .fetch_all_by_date_range(
            &request.query,
            request.date_range,
            request.fields.as_deref(),
            request.max_fetch,
        )
        .await?;

    let mut papers = filter_excluded_terms(fetched, &request.exclude_terms).papers;
    if papers.is_empty() {
        info!(
            "No papers found for query '{}' in the specified date range",
            request.query
        );
        return Ok(Vec::new());
    }

    let total = papers.len();
    sort_by_citations(&mut papers);
    papers.truncate(request.top_n);

    info!(
        "Selected top {} most cited papers from {} total papers",
        papers.len(),
        total
    );
    Ok(papers)
}

/// Recent papers for each keyword, in keyword order.
///
/// With impact sorting on, papers are ranked by impact score; with only
/// scoring on, they keep fetch order but carry their assessment. If the
/// journal store fails for a keyword, that keyword is left unscored in fetch
/// order. Fatal API errors abort the whole run.
pub async fn recent_by_keywords(
    client: &mut SemanticScholarClient,
    store: Option<&JournalStore>,
    request: &RecentRequest,
) -> Result<Vec<KeywordResults>, ApiError> {
    let date_range = request.date_range;
    let scorer = store
        .filter(|_| request.sort_by_impact || request.score_impact)
        .map(ImpactScorer::new);
    let mut results = Vec::with_capacity(request.keywords.len());

    for keyword in &request.keywords {
        info!(
            "Searching for '{}' from {} to {}",
            keyword, date_range.start, date_range.end
        );

        let fetched = client
            .fetch_all_by_date_range(
                keyword,
                date_range,
                request.fields.as_deref(),
                request.max_results_per_keyword,
            )
            .await?;
        let papers = filter_excluded_terms(fetched, &request.exclude_terms).papers;

        let papers = match &scorer {
            Some(scorer) => match scorer.score_all(papers.clone()) {
                Ok(mut scored) if request.sort_by_impact => {
                    sort_by_impact(&mut scored);
                    info!(
                        "Found {} papers for '{}' (sorted by impact)",
                        scored.len(),
                        keyword
                    );
                    scored
                }
                Ok(scored) => {
                    info!("Found {} papers for '{}'", scored.len(), keyword);
                    scored
                }
                Err(e) => {
                    warn!("Impact scoring failed for '{}': {}", keyword, e);
                    papers.into_iter().map(ScoredPaper::unscored).collect()
                }
            },
            None => {
                info!("Found {} papers for '{}'", papers.len(), keyword);
                papers.into_iter().map(ScoredPaper::unscored).collect()
            }
        };

        results.push(KeywordResults {
            keyword: keyword.clone(),
            papers,
        });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::semantic_scholar::ClientConfig;
    use crate::models::NewJournal;
    use crate::utils::http::RetryConfig;
    use chrono::NaiveDate;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::time::Duration;
    use tempfile::tempdir;

    fn client(base_url: String) -> SemanticScholarClient {
        let config = ClientConfig {
            base_url,
            min_interval: Duration::ZERO,
            retry: RetryConfig {
                max_attempts: 1,
                initial_backoff: Duration::from_millis(1),
                ..RetryConfig::default()
            },
            pagination_pause: Duration::from_millis(1),
            ..ClientConfig::default()
        };
        SemanticScholarClient::new("key", config).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sort_by_citations_is_stable() {
        let mut papers: Vec<Paper> = [
            json!({"paperId": "a", "citationCount": 3}),
            json!({"paperId": "b"}),
            json!({"paperId": "c", "citationCount": 9}),
            json!({"paperId": "d", "citationCount": 3}),
        ]
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect();

        sort_by_citations(&mut papers);
        let ids: Vec<_> = papers.iter().map(|p| p.paper_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["c", "a", "d", "b"]);
    }

    #[tokio::test]
    async fn test_top_cited_filters_and_truncates() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "IBD".into()),
                Matcher::UrlEncoded(
                    "publicationDateOrYear".into(),
                    "2024-01-01:2024-12-31".into(),
                ),
            ]))
            .with_status(200)
            .with_body(
                json!({"data": [
                    {"paperId": "low", "title": "Low", "citationCount": 1},
                    {"paperId": "micro", "title": "Gut microbiome in IBD", "citationCount": 500},
                    {"paperId": "high", "title": "High", "citationCount": 90},
                    {"paperId": "mid", "title": "Mid", "abstract": "Genetics.", "citationCount": 40}
                ]})
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let mut client = client(server.url());
        let request = TopCitedRequest {
            query: "IBD".to_string(),
            date_range: DateRange::new(date(2024, 1, 1), date(2024, 12, 31)),
            top_n: 2,
            fields: None,
            max_fetch: 1000,
            exclude_terms: vec!["Microbiome".to_string()],
        };

        let top = top_cited(&mut client, &request).await.unwrap();
        let ids: Vec<_> = top.iter().map(|p| p.paper_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["high", "mid"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_recent_by_keywords_ranks_by_impact() {
        let mut server = Server::new_async().await;
        let genetics = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "IBD genetics".into()),
                Matcher::UrlEncoded(
                    "publicationDateOrYear".into(),
                    "2024-03-01:2024-03-08".into(),
                ),
            ]))
            .with_status(200)
            .with_body(
                json!({"data": [
                    {"paperId": "unknown", "venue": "Unlisted Letters", "citationCount": 0},
                    {"paperId": "gut", "venue": "Gut", "citationCount": 5},
                    {"paperId": "probiotic", "title": "Probiotics trial", "venue": "Gut"}
                ]})
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let colitis = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::UrlEncoded("query".into(), "colitis".into()))
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .expect(1)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let store = JournalStore::open(dir.path().join("j.db")).unwrap();
        store
            .upsert(&NewJournal {
                issn_l: "0017-5749".to_string(),
                display_name: Some("Gut".to_string()),
                works_count: 100,
                cited_by_count: 500,
                ..Default::default()
            })
            .unwrap();

        let mut client = client(server.url());
        let request = RecentRequest {
            keywords: vec!["IBD genetics".to_string(), "colitis".to_string()],
            date_range: DateRange::new(date(2024, 3, 1), date(2024, 3, 8)),
            fields: None,
            max_results_per_keyword: 150,
            exclude_terms: vec!["probiotics".to_string()],
            sort_by_impact: true,
            score_impact: false,
        };

        let results = recent_by_keywords(&mut client, Some(&store), &request)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].keyword, "IBD genetics");
        let ids: Vec<_> = results[0]
            .papers
            .iter()
            .map(|s| s.paper.paper_id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["gut", "unknown"]);
        assert_eq!(results[0].papers[0].impact.as_ref().unwrap().score, 20.0);
        assert!(results[1].papers.is_empty());

        genetics.assert_async().await;
        colitis.assert_async().await;
    }

    #[tokio::test]
    async fn test_recent_without_impact_keeps_fetch_order() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({"data": [
                    {"paperId": "first", "venue": "Unlisted"},
                    {"paperId": "second", "citationCount": 100}
                ]})
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let mut client = client(server.url());
        let request = RecentRequest {
            keywords: vec!["crohn".to_string()],
            date_range: DateRange::new(date(2024, 3, 1), date(2024, 3, 8)),
            fields: None,
            max_results_per_keyword: 150,
            exclude_terms: Vec::new(),
            sort_by_impact: false,
            score_impact: false,
        };

        let results = recent_by_keywords(&mut client, None, &request).await.unwrap();
        let papers = &results[0].papers;
        assert_eq!(papers[0].paper.paper_id.as_deref(), Some("first"));
        assert!(papers.iter().all(|s| s.impact.is_none()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_recent_scores_without_reordering() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({"data": [
                    {"paperId": "unknown", "venue": "Unlisted Letters"},
                    {"paperId": "gut", "venue": "Gut", "citationCount": 5}
                ]})
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let store = JournalStore::open(dir.path().join("j.db")).unwrap();
        store
            .upsert(&NewJournal {
                issn_l: "0017-5749".to_string(),
                display_name: Some("Gut".to_string()),
                works_count: 100,
                cited_by_count: 500,
                ..Default::default()
            })
            .unwrap();

        let mut client = client(server.url());
        let request = RecentRequest {
            keywords: vec!["crohn".to_string()],
            date_range: DateRange::new(date(2024, 3, 1), date(2024, 3, 8)),
            fields: None,
            max_results_per_keyword: 150,
            exclude_terms: Vec::new(),
            sort_by_impact: false,
            score_impact: true,
        };

        let results = recent_by_keywords(&mut client, Some(&store), &request)
            .await
            .unwrap();
        let papers = &results[0].papers;
        assert_eq!(papers[0].paper.paper_id.as_deref(), Some("unknown"));
        assert_eq!(papers[0].impact.as_ref().unwrap().score, 10.0);
        assert_eq!(papers[1].impact.as_ref().unwrap().score, 20.0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_recent_aborts_on_auth_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::Any)
            .with_status(403)
            .create_async()
            .await;

        let mut client = client(server.url());
        let request = RecentRequest {
            keywords: vec!["a".to_string(), "b".to_string()],
            date_range: DateRange::new(date(2024, 3, 1), date(2024, 3, 8)),
            fields: None,
            max_results_per_keyword: 10,
            exclude_terms: Vec::new(),
            sort_by_impact: false,
            score_impact: false,
        };

        let result = recent_by_keywords(&mut client, None, &request).await;
        assert!(matches!(result, Err(ApiError::Auth { status: 403 })));
    }
}
