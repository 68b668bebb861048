//! HTTP utilities with retry logic and rate limiting
//!
//! Provides a minimum-interval request gate, exponential backoff and the
//! status classification shared by the API clients.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Errors that escape a retried request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API key is required for authenticated requests")]
    MissingApiKey,
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
    #[error("Invalid API key or insufficient permissions (HTTP {status})")]
    Auth { status: u16 },
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Fatal errors abort the whole operation instead of degrading.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ApiError::Auth { .. } | ApiError::MissingApiKey)
    }
}

/// Enforces a minimum interval between consecutive requests.
///
/// One gate belongs to one client; it is not meant to be shared between
/// concurrent callers.
#[derive(Debug)]
pub struct RequestGate {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl RequestGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Time left before the next request may be issued.
    pub fn time_until_slot(&self) -> Option<Duration> {
        let last = self.last_request?;
        let elapsed = last.elapsed();
        if elapsed < self.min_interval {
            Some(self.min_interval - elapsed)
        } else {
            None
        }
    }

    /// Sleep out the remainder of the interval, then stamp the issuance time.
    pub async fn wait(&mut self) {
        if let Some(remaining) = self.time_until_slot() {
            debug!(
                "Waiting for {:.2} seconds to respect rate limit",
                remaining.as_secs_f64()
            );
            tokio::time::sleep(remaining).await;
        }
        self.last_request = Some(Instant::now());
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
    /// Backoff multiplier (exponential factor)
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(5),
            max_backoff: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Calculate backoff duration for a given attempt
    ///
    /// # Arguments
    /// * `attempt` - The attempt number (0-indexed)
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_ms =
            self.initial_backoff.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let backoff = Duration::from_millis(backoff_ms as u64);
        backoff.min(self.max_backoff)
    }
}

/// How a response status is handled by [`with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    /// 401/403: credentials rejected, never retried
    Fatal,
    /// 400: the API refuses to page further
    Boundary,
    /// 429: server-side throttling
    RateLimited,
    Retryable,
}

pub fn classify_status(status: StatusCode) -> StatusClass {
    match status.as_u16() {
        200..=299 => StatusClass::Success,
        401 | 403 => StatusClass::Fatal,
        400 => StatusClass::Boundary,
        429 => StatusClass::RateLimited,
        _ => StatusClass::Retryable,
    }
}

/// Send a request through the gate, retrying with exponential backoff.
///
/// Returns `Ok(None)` when the server signals a pagination boundary (400) or
/// when every attempt failed; callers treat both as an empty result. Auth
/// failures and undecodable success bodies are returned as errors.
///
/// # Arguments
/// * `config` - Retry configuration
/// * `gate` - Gate awaited before every attempt, retries included
/// * `operation_name` - Label used in log lines
/// * `send` - Builds and sends one request
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    gate: &mut RequestGate,
    operation_name: &str,
    mut send: F,
) -> Result<Option<T>, ApiError>
where
    T: DeserializeOwned,
    F: FnMut() -> Fut,
    Fut: Future<Output = reqwest::Result<Response>>,
{
    for attempt in 0..config.max_attempts {
        gate.wait().await;

        let failure = match send().await {
            Ok(resp) => {
                let status = resp.status();
                match classify_status(status) {
                    StatusClass::Success => {
                        if attempt > 0 {
                            debug!("{} succeeded on attempt {}", operation_name, attempt + 1);
                        }
                        return resp
                            .json::<T>()
                            .await
                            .map(Some)
                            .map_err(|e| ApiError::Decode(e.to_string()));
                    }
                    StatusClass::Fatal => {
                        return Err(ApiError::Auth {
                            status: status.as_u16(),
                        });
                    }
                    StatusClass::Boundary => {
                        info!(
                            "{}: bad request (400), likely pagination limit reached",
                            operation_name
                        );
                        return Ok(None);
                    }
                    StatusClass::RateLimited => "rate limit hit (429)".to_string(),
                    StatusClass::Retryable => format!("status: {}", status),
                }
            }
            Err(e) => format!("network error: {}", e),
        };

        if attempt + 1 < config.max_attempts {
            let backoff = config.backoff_for_attempt(attempt);
            warn!(
                "{} failed (attempt {}): {}. Retrying in {:?}",
                operation_name,
                attempt + 1,
                failure,
                backoff
            );
            tokio::time::sleep(backoff).await;
        } else {
            warn!(
                "{} failed (attempt {}): {}",
                operation_name,
                attempt + 1,
                failure
            );
        }
    }

    warn!(
        "{} failed after {} attempts, returning empty result",
        operation_name, config.max_attempts
    );
    Ok(None)
}
