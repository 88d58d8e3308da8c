//! Channel-operation pipeline
//!
//! Executes an ordered list of per-channel operations against a working
//! image, converting between pixel modes on demand so each operation sees
//! the mode that carries its target channel.
//!
//! This module is organized into submodules:
//! - `ops`: numeric transforms over one channel of the interleaved buffer
//! - `stats`: channel statistics backing the keyword parameters

mod ops;
mod stats;


pub use ops::{
    clamp_channel, clamp_channel_unit, invert_channel, offset_channel, scale_channel,
    threshold_channel,
};
pub use stats::compute_statistic;

use crate::buffer::{nearest_mode_for, ImageBuffer};
use crate::models::{OpParam, PipelineOp};
use crate::verbose_println;

/// Options controlling pipeline execution
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Clamp the affected channel into [0,1] after each operation
    pub auto_clamp: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { auto_clamp: true }
    }
}

/// Applies channel operations to a working image.
///
/// The executor remembers the pixel mode the image arrived in; rendering
/// for output always converts back to that mode, so results are saved in
/// the input's channel format regardless of the modes the operations
/// passed through.
pub struct Executor {
    buffer: ImageBuffer,
    source_mode: crate::models::PixelMode,
    auto_clamp: bool,
}

impl Executor {
    /// Create an executor over a freshly decoded image
    pub fn new(buffer: ImageBuffer) -> Self {
        let source_mode = buffer.mode;
        Self {
            buffer,
            source_mode,
            auto_clamp: true,
        }
    }

    /// Enable or disable the post-operation [0,1] clamp
    pub fn set_auto_clamp(&mut self, auto_clamp: bool) {
        self.auto_clamp = auto_clamp;
    }

    /// Replace the working image (keeps the auto-clamp setting)
    pub fn load(&mut self, buffer: ImageBuffer) {
        self.source_mode = buffer.mode;
        self.buffer = buffer;
    }

    /// Current working image
    pub fn buffer(&self) -> &ImageBuffer {
        &self.buffer
    }

    /// Apply one operation, converting the working mode if the target
    /// channel is not present in it.
    pub fn apply(&mut self, op: &PipelineOp) -> Result<(), String> {
        let channel = op.channel();

        let target_mode = nearest_mode_for(self.buffer.mode, channel)?;
        if target_mode != self.buffer.mode {
            verbose_println!(
                "[chanops] Converting {} -> {} for channel '{}'",
                self.buffer.mode.as_str(),
                target_mode.as_str(),
                channel
            );
            self.buffer.convert(target_mode);
        }

        let channels = self.buffer.mode.channel_count();
        let index = self
            .buffer
            .mode
            .channel_index(channel)
            .ok_or_else(|| format!("Channel '{}' missing after mode conversion", channel))?;

        match op {
            PipelineOp::Invert { .. } => {
                invert_channel(&mut self.buffer.data, channels, index);
            }
            PipelineOp::Offset { amount, .. } => {
                offset_channel(&mut self.buffer.data, channels, index, *amount);
            }
            PipelineOp::Scale { factor, .. } => {
                scale_channel(&mut self.buffer.data, channels, index, *factor);
            }
            PipelineOp::Threshold { cutoff, .. } => {
                let cutoff = self.resolve_param(*cutoff, index);
                threshold_channel(&mut self.buffer.data, channels, index, cutoff);
            }
            PipelineOp::Clamp { mode, limit, .. } => {
                let limit = self.resolve_param(*limit, index);
                clamp_channel(&mut self.buffer.data, channels, index, *mode, limit);
            }
        }

        if self.auto_clamp {
            clamp_channel_unit(&mut self.buffer.data, channels, index);
        }

        Ok(())
    }

    /// Resolve a literal-or-statistic parameter against the target channel
    fn resolve_param(&self, param: OpParam, index: usize) -> f32 {
        match param {
            OpParam::Value(v) => v,
            OpParam::Stat(stat) => {
                let plane = self.buffer.channel_plane(index);
                let value = compute_statistic(&plane, stat);
                verbose_println!("[chanops] Resolved {:?} to {:.6}", stat, value);
                value
            }
        }
    }

    /// Render the working image in its source pixel mode for saving
    pub fn render(&self) -> ImageBuffer {
        self.buffer.converted(self.source_mode)
    }

    /// Consume the executor, converting back to the source pixel mode
    pub fn into_output(mut self) -> ImageBuffer {
        self.buffer.convert(self.source_mode);
        self.buffer
    }
}

/// Run a full operation list over an image and return the result in the
/// image's original pixel mode.
pub fn run_pipeline(
    buffer: ImageBuffer,
    pipeline: &[PipelineOp],
    options: &PipelineOptions,
) -> Result<ImageBuffer, String> {
    let mut executor = Executor::new(buffer);
    executor.set_auto_clamp(options.auto_clamp);

    for op in pipeline {
        verbose_println!("[chanops] Applying {} on '{}'", op.name(), op.channel());
        executor.apply(op)?;
    }

    Ok(executor.into_output())
}
