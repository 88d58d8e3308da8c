//! Shared utilities for chanops-cli
//!
//! The pipeline grammar parser and the stage runner live here so they can
//! be unit tested apart from the binary entry point.

pub mod parsers;
pub mod processing;

// Re-export commonly used items at the crate root for convenience
pub use parsers::{parse_pipeline, ParsedPipeline, Stage};
pub use processing::run_stages;
