//! Chanops Core Library
//!
//! Core functionality for per-channel arithmetic image transformations.

pub mod buffer;
pub mod color;
pub mod config;
pub mod decoders;
pub mod exporters;
pub mod models;
pub mod pipeline;

// Re-export commonly used types
pub use buffer::ImageBuffer;
pub use models::{
    Channel, ClampMode, ImageFormat, OpParam, PipelineOp, PixelMode, SampleDepth, Statistic,
};
pub use pipeline::{run_pipeline, Executor, PipelineOptions};
