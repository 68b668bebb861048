//! Services module for business logic
//!
//! This module contains service implementations that coordinate
//! between adapters, storage, and commands.

pub mod digest;
pub mod impact;
pub mod paper_filter;

pub use impact::{ImpactAssessment, ImpactScorer, ScoredPaper};
pub use paper_filter::{filter_excluded_terms, FilterOutcome};
