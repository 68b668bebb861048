//! External service adapters
//!
//! This module contains adapters for external services and APIs:
//! - Semantic Scholar: paginated, rate-limited paper search and detail lookup
//! - OpenAlex: bulk journal statistics for the local metric cache

pub mod openalex;
pub mod semantic_scholar;

// Re-export commonly used types
pub use openalex::OpenAlexClient;
pub use semantic_scholar::{ClientConfig, DateRange, SemanticScholarClient};
