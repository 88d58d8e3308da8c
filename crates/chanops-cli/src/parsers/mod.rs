//! Hand-written parsing for the pipeline token grammar.
//!
//! clap handles the outer surface (help, version, global flags); the
//! chained `operation [+channels value...]` grammar with its `+x` selector
//! flags is parsed here.

mod command;
mod pipeline;

pub use pipeline::{parse_pipeline, ParsedPipeline, Stage};
