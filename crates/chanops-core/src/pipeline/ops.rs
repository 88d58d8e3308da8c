//! Numeric transforms applied to one channel of an interleaved buffer.
//!
//! Every function walks the buffer with the pixel stride and touches only
//! the sample at `index`. Large images are processed in parallel with the
//! same chunking approach used elsewhere in the crate.

use rayon::prelude::*;

use crate::config;
use crate::models::ClampMode;

// Pixels per work unit for parallel chunks (good cache locality)
const CHUNK_PIXELS: usize = 256;

/// Apply `f` to one channel of every pixel
fn map_channel<F>(data: &mut [f32], channels: usize, index: usize, f: F)
where
    F: Fn(f32) -> f32 + Sync,
{
    let pixels = data.len() / channels;

    if pixels >= config::parallel_threshold() {
        let chunk = channels * CHUNK_PIXELS;
        data.par_chunks_mut(chunk).for_each(|run| {
            for pixel in run.chunks_exact_mut(channels) {
                pixel[index] = f(pixel[index]);
            }
        });
    } else {
        for pixel in data.chunks_exact_mut(channels) {
            pixel[index] = f(pixel[index]);
        }
    }
}

/// x = 1 - x
pub fn invert_channel(data: &mut [f32], channels: usize, index: usize) {
    map_channel(data, channels, index, |x| 1.0 - x);
}

/// x = x + amount
pub fn offset_channel(data: &mut [f32], channels: usize, index: usize, amount: f32) {
    map_channel(data, channels, index, |x| x + amount);
}

/// x = x * factor
pub fn scale_channel(data: &mut [f32], channels: usize, index: usize, factor: f32) {
    map_channel(data, channels, index, |x| x * factor);
}

/// x = 0 if x < cutoff else 1
pub fn threshold_channel(data: &mut [f32], channels: usize, index: usize, cutoff: f32) {
    map_channel(
        data,
        channels,
        index,
        |x| if x < cutoff { 0.0 } else { 1.0 },
    );
}

/// x = min(x, limit) or x = max(x, limit)
pub fn clamp_channel(data: &mut [f32], channels: usize, index: usize, mode: ClampMode, limit: f32) {
    match mode {
        ClampMode::Min => map_channel(data, channels, index, |x| x.min(limit)),
        ClampMode::Max => map_channel(data, channels, index, |x| x.max(limit)),
    }
}

/// Clamp one channel back into the normalized [0,1] range
pub fn clamp_channel_unit(data: &mut [f32], channels: usize, index: usize) {
    map_channel(data, channels, index, |x| x.clamp(0.0, 1.0));
}
