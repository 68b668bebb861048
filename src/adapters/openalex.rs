//! OpenAlex sources client
//!
//! Bulk-populates the journal metric store from the OpenAlex `sources`
//! endpoint using cursor pagination.
//! See: https://docs.openalex.org/api-entities/sources

use crate::models::NewJournal;
use crate::storage::{DatabaseError, JournalStore};
use crate::utils::http::{ApiError, RequestGate};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

pub const OPENALEX_BASE_URL: &str = "https://api.openalex.org";

const SOURCE_FILTER: &str = "type:journal,works_count:>100";
const PER_PAGE: u32 = 200;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Spacing between sources requests.
const REQUEST_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Deserialize)]
struct SourcesResponse {
    #[serde(default)]
    results: Vec<Source>,
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Source {
    issn_l: Option<String>,
    issn: Option<Vec<String>>,
    display_name: Option<String>,
    works_count: Option<i64>,
    cited_by_count: Option<i64>,
    summary_stats: Option<SummaryStats>,
}

#[derive(Debug, Deserialize)]
struct SummaryStats {
    h_index: Option<i64>,
}

impl Source {
    /// Convert to a store record; sources without a linking ISSN are skipped.
    fn into_journal(self) -> Option<NewJournal> {
        let issn_l = self.issn_l.filter(|s| !s.trim().is_empty())?;
        let mut issns = self.issn.unwrap_or_default().into_iter();
        Some(NewJournal {
            issn_l,
            display_name: self.display_name,
            issn_print: issns.next(),
            issn_online: issns.next(),
            works_count: self.works_count.unwrap_or(0),
            cited_by_count: self.cited_by_count.unwrap_or(0),
            h_index: self.summary_stats.and_then(|s| s.h_index).unwrap_or(0),
        })
    }
}

/// Client for the OpenAlex API
pub struct OpenAlexClient {
    client: Client,
    base_url: String,
    gate: RequestGate,
}

impl OpenAlexClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(concat!("scholar-digest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            gate: RequestGate::new(REQUEST_INTERVAL),
        })
    }

    async fn fetch_page(&mut self, cursor: &str) -> Result<SourcesResponse, String> {
        let url = format!("{}/sources", self.base_url.trim_end_matches('/'));
        let per_page = PER_PAGE.to_string();

        self.gate.wait().await;
        debug!("OpenAlex sources page, cursor {}", cursor);

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&[
                ("filter", SOURCE_FILTER),
                ("per-page", per_page.as_str()),
                ("cursor", cursor),
            ])
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!("API error: {}", resp.status()));
        }

        resp.json::<SourcesResponse>()
            .await
            .map_err(|e| format!("parse failed: {}", e))
    }

    /// Import up to `max_journals` journals into `store`.
    ///
    /// HTTP failures end the import early and are logged; the number of
    /// journals written so far is returned. Store failures are returned as
    /// errors.
    pub async fn populate_journals(
        &mut self,
        store: &JournalStore,
        max_journals: usize,
    ) -> Result<usize, DatabaseError> {
        let mut processed = 0;
        let mut cursor = "*".to_string();

        while processed < max_journals {
            let page = match self.fetch_page(&cursor).await {
                Ok(page) => page,
                Err(e) => {
                    error!("OpenAlex population stopped: {}", e);
                    break;
                }
            };

            if page.results.is_empty() {
                break;
            }

            for source in page.results {
                if processed >= max_journals {
                    break;
                }
                let Some(journal) = source.into_journal() else {
                    continue;
                };
                store.upsert(&journal)?;
                processed += 1;

                if processed % 100 == 0 {
                    info!("Processed {} journals", processed);
                }
            }

            match page.meta.and_then(|m| m.next_cursor) {
                Some(next) => cursor = next,
                None => break,
            }
        }

        info!("Database populated with {} journals", processed);
        Ok(processed)
    }
}
