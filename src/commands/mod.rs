//! Command handlers behind the CLI subcommands
//!
//! Each handler writes its user-facing output to the given writer; logging
//! goes through `tracing`.

pub mod digest;
pub mod journals;
pub mod papers;
pub mod settings;
