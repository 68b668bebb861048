//! Research digests from the Semantic Scholar search API.
//!
//! Papers are fetched through a rate-limited, retrying, paginated client,
//! filtered for unwanted terms and ranked by an impact score derived from a
//! local SQLite cache of journal statistics.

pub mod adapters;
pub mod commands;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
