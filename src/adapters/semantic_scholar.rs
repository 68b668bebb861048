//! Semantic Scholar API client
//!
//! Provides rate-limited paper search, date-range pagination and paper
//! detail lookup against the Academic Graph API.
//! See: https://api.semanticscholar.org/

use crate::models::{Paper, SearchPage};
use crate::utils::http::{with_retry, ApiError, RequestGate, RetryConfig};
use chrono::{Days, NaiveDate};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.semanticscholar.org/graph/v1";

/// Fields requested when the caller does not name any.
pub const DEFAULT_FIELDS: &str =
    "title,year,abstract,citationCount,publicationDate,venue,externalIds,authors,tldr";

/// Page size used by the date-range fetcher.
pub const PAGE_SIZE: usize = 100;

/// Consecutive escaped errors that stop pagination.
const MAX_CONSECUTIVE_FAILURES: u32 = 2;

/// Closed publication date range, rendered as `YYYY-MM-DD:YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days` days up to and including `end`, or `None` when the start
    /// would fall outside the supported calendar.
    pub fn days_back(end: NaiveDate, days: u32) -> Option<Self> {
        let start = end.checked_sub_days(Days::new(u64::from(days)))?;
        Some(Self { start, end })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Connection and pacing settings for [`SemanticScholarClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub default_fields: String,
    /// Minimum spacing between outbound requests
    pub min_interval: Duration,
    pub retry: RetryConfig,
    /// Pause after an error escapes a page request
    pub pagination_pause: Duration,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_fields: DEFAULT_FIELDS.to_string(),
            min_interval: Duration::from_millis(1100),
            retry: RetryConfig::default(),
            pagination_pause: Duration::from_secs(5),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Client for the Semantic Scholar API
///
/// Every request goes through the client's own [`RequestGate`], so methods
/// take `&mut self` and requests are strictly sequential.
pub struct SemanticScholarClient {
    client: Client,
    api_key: String,
    gate: RequestGate,
    config: ClientConfig,
}

impl SemanticScholarClient {
    /// Create a new Semantic Scholar client
    ///
    /// # Arguments
    /// * `api_key` - API key sent as `x-api-key`; must not be empty
    /// * `config` - Base URL, pacing and retry settings
    pub fn new(api_key: impl Into<String>, config: ClientConfig) -> Result<Self, ApiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ApiError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            gate: RequestGate::new(config.min_interval),
            config,
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Fetch a single page of search results.
    ///
    /// A pagination boundary or an exhausted retry budget yields an empty page.
    pub async fn search_papers(
        &mut self,
        query: &str,
        fields: Option<&str>,
        date_range: Option<DateRange>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Paper>, ApiError> {
        let url = self.endpoint_url("paper/search");
        let fields = fields.unwrap_or(&self.config.default_fields).to_string();

        let mut params = vec![
            ("query", query.to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
            ("fields", fields),
        ];
        if let Some(range) = date_range {
            params.push(("publicationDateOrYear", range.to_string()));
        }

        debug!("Semantic Scholar search '{}' offset {} limit {}", query, offset, limit);

        let client = &self.client;
        let api_key = &self.api_key;
        let page: Option<SearchPage> = with_retry(
            &self.config.retry,
            &mut self.gate,
            &format!("Semantic Scholar search '{}' at offset {}", query, offset),
            || {
                client
                    .get(&url)
                    .query(&params)
                    .header("x-api-key", api_key)
                    .send()
            },
        )
        .await?;

        Ok(page.map(|p| p.data).unwrap_or_default())
    }

    /// Fetch a single page restricted to a publication date range.
    pub async fn search_by_date_range(
        &mut self,
        query: &str,
        date_range: DateRange,
        fields: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Paper>, ApiError> {
        self.search_papers(query, fields, Some(date_range), limit, offset)
            .await
    }

    /// Accumulate papers across pages until `max_results` is reached or the
    /// server runs out.
    ///
    /// Stops on an empty page, a short page, or two consecutive errors
    /// escaping the page request. The result may hold up to one page more
    /// than `max_results`. Only fatal errors are returned; every other stop
    /// returns what was gathered so far.
    pub async fn fetch_all_by_date_range(
        &mut self,
        query: &str,
        date_range: DateRange,
        fields: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<Paper>, ApiError> {
        let mut papers: Vec<Paper> = Vec::new();
        let mut offset = 0;
        let mut consecutive_failures = 0;

        info!(
            "Fetching papers from {} to {} with query '{}'",
            date_range.start, date_range.end, query
        );

        while papers.len() < max_results {
            match self
                .search_by_date_range(query, date_range, fields, PAGE_SIZE, offset)
                .await
            {
                Ok(page) => {
                    if page.is_empty() {
                        info!(
                            "No more papers found. Stopping pagination at {} papers",
                            papers.len()
                        );
                        break;
                    }

                    let page_len = page.len();
                    papers.extend(page);
                    offset += PAGE_SIZE;
                    consecutive_failures = 0;
                    info!("Fetched {} papers so far", papers.len());

                    if page_len < PAGE_SIZE {
                        info!(
                            "Received fewer papers than requested ({} < {}). End of results",
                            page_len, PAGE_SIZE
                        );
                        break;
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    consecutive_failures += 1;
                    warn!(
                        "Error during pagination (attempt {}): {}",
                        consecutive_failures, e
                    );

                    if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                        warn!(
                            "Too many consecutive failures ({}). Stopping pagination",
                            consecutive_failures
                        );
                        break;
                    }

                    tokio::time::sleep(self.config.pagination_pause).await;
                }
            }
        }

        info!("Final result: {} papers fetched", papers.len());
        Ok(papers)
    }

    /// Look up a single paper by any id the API accepts
    /// (S2 id, `DOI:...`, `CorpusId:...`, ...).
    ///
    /// # Returns
    /// * `Ok(Some(paper))` - The paper was found
    /// * `Ok(None)` - Lookup degraded after retries or was rejected as a bad request
    pub async fn paper_details(
        &mut self,
        paper_id: &str,
        fields: Option<&str>,
    ) -> Result<Option<Paper>, ApiError> {
        let url = self.endpoint_url(&format!("paper/{}", urlencoding::encode(paper_id)));
        let fields = fields.unwrap_or(&self.config.default_fields).to_string();

        debug!("Semantic Scholar detail lookup: {}", paper_id);

        let client = &self.client;
        let api_key = &self.api_key;
        with_retry(
            &self.config.retry,
            &mut self.gate,
            &format!("Semantic Scholar details for {}", paper_id),
            || {
                client
                    .get(&url)
                    .query(&[("fields", fields.as_str())])
                    .header("x-api-key", api_key)
                    .send()
            },
        )
        .await
    }
}
