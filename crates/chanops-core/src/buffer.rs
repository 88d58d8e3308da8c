//! In-memory image representation and pixel-mode conversion.

use rayon::prelude::*;

use crate::color::{hsv_to_rgb, rgb_to_hsv, rgb_to_luma, Hsv};
use crate::config;
use crate::models::{Channel, ImageFormat, PixelMode, SampleDepth};

// Pixels per work unit when converting in parallel
const CHUNK_PIXELS: usize = 256;

/// A decoded image held in normalized f32 form.
///
/// Samples are interleaved per pixel in the order given by
/// `mode.channels()`, each in [0,1]. The source depth and container format
/// are remembered so the image can be re-encoded exactly as it came in.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Current pixel layout of `data`
    pub mode: PixelMode,

    /// Interleaved normalized samples, `mode.channel_count()` per pixel
    pub data: Vec<f32>,

    /// Bit depth of the source file
    pub depth: SampleDepth,

    /// Container format of the source file
    pub source_format: ImageFormat,
}

impl ImageBuffer {
    /// Number of pixels in the image
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Copy one channel out of the interleaved data as a contiguous plane
    pub fn channel_plane(&self, index: usize) -> Vec<f32> {
        let channels = self.mode.channel_count();
        self.data
            .chunks_exact(channels)
            .map(|pixel| pixel[index])
            .collect()
    }

    /// Convert the buffer into a new pixel mode in place.
    ///
    /// Converting to the current mode is a no-op. Modes without alpha drop
    /// it; converting back yields fully opaque pixels.
    pub fn convert(&mut self, target: PixelMode) {
        if self.mode == target {
            return;
        }

        let from = self.mode;
        let src_channels = from.channel_count();
        let dst_channels = target.channel_count();
        let pixels = self.pixel_count();
        let mut out = vec![0.0f32; pixels * dst_channels];

        if pixels >= config::parallel_threshold() {
            out.par_chunks_mut(dst_channels * CHUNK_PIXELS)
                .zip(self.data.par_chunks(src_channels * CHUNK_PIXELS))
                .for_each(|(dst, src)| convert_run(src, dst, from, target));
        } else {
            convert_run(&self.data, &mut out, from, target);
        }

        self.data = out;
        self.mode = target;
    }

    /// Return a copy of this buffer converted to the given mode
    pub fn converted(&self, target: PixelMode) -> ImageBuffer {
        let mut copy = self.clone();
        copy.convert(target);
        copy
    }
}

/// Pick the closest pixel mode to `current` that carries `channel`.
///
/// Mirrors the mode-preference table of the original tool: for example an
/// RGB image asked to operate on hue converts to HSV, while an HSV image
/// asked for luminance goes through LA.
pub fn nearest_mode_for(current: PixelMode, channel: Channel) -> Result<PixelMode, String> {
    if current.has_channel(channel) {
        return Ok(current);
    }

    let preferences: &[PixelMode] = match current {
        PixelMode::Rgb => &[PixelMode::Rgba, PixelMode::Hsv, PixelMode::Luma],
        PixelMode::Rgba => &[PixelMode::Hsv, PixelMode::Luma],
        PixelMode::Hsv => &[PixelMode::Rgba, PixelMode::LumaA],
        PixelMode::Luma => &[PixelMode::Rgb, PixelMode::Rgba, PixelMode::Hsv],
        PixelMode::LumaA => &[PixelMode::Rgba, PixelMode::Hsv],
    };

    preferences
        .iter()
        .copied()
        .find(|mode| mode.has_channel(channel))
        .ok_or_else(|| format!("No pixel mode supports the channel '{}'", channel))
}

/// Convert a run of interleaved pixels between two modes
fn convert_run(src: &[f32], dst: &mut [f32], from: PixelMode, to: PixelMode) {
    let src_channels = from.channel_count();
    let dst_channels = to.channel_count();

    for (pixel_in, pixel_out) in src
        .chunks_exact(src_channels)
        .zip(dst.chunks_exact_mut(dst_channels))
    {
        let rgba = pixel_to_rgba(pixel_in, from);
        rgba_to_pixel(rgba, pixel_out, to);
    }
}

/// Expand a pixel of any mode to (r, g, b, a)
#[inline]
fn pixel_to_rgba(pixel: &[f32], mode: PixelMode) -> [f32; 4] {
    match mode {
        PixelMode::Luma => [pixel[0], pixel[0], pixel[0], 1.0],
        PixelMode::LumaA => [pixel[0], pixel[0], pixel[0], pixel[1]],
        PixelMode::Rgb => [pixel[0], pixel[1], pixel[2], 1.0],
        PixelMode::Rgba => [pixel[0], pixel[1], pixel[2], pixel[3]],
        PixelMode::Hsv => {
            let (r, g, b) = hsv_to_rgb(Hsv {
                h: pixel[0],
                s: pixel[1],
                v: pixel[2],
            });
            [r, g, b, 1.0]
        }
    }
}

/// Collapse an (r, g, b, a) pixel into the target mode
#[inline]
fn rgba_to_pixel(rgba: [f32; 4], pixel: &mut [f32], mode: PixelMode) {
    let [r, g, b, a] = rgba;
    match mode {
        PixelMode::Luma => {
            pixel[0] = rgb_to_luma(r, g, b);
        }
        PixelMode::LumaA => {
            pixel[0] = rgb_to_luma(r, g, b);
            pixel[1] = a;
        }
        PixelMode::Rgb => {
            pixel[0] = r;
            pixel[1] = g;
            pixel[2] = b;
        }
        PixelMode::Rgba => {
            pixel[0] = r;
            pixel[1] = g;
            pixel[2] = b;
            pixel[3] = a;
        }
        PixelMode::Hsv => {
            let hsv = rgb_to_hsv(r, g, b);
            pixel[0] = hsv.h;
            pixel[1] = hsv.s;
            pixel[2] = hsv.v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_buffer(data: Vec<f32>, width: u32, height: u32) -> ImageBuffer {
        ImageBuffer {
            width,
            height,
            mode: PixelMode::Rgb,
            data,
            depth: SampleDepth::Eight,
            source_format: ImageFormat::Png,
        }
    }

    #[test]
    fn test_convert_to_same_mode_is_noop() {
        let data = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let mut buffer = rgb_buffer(data.clone(), 2, 1);
        buffer.convert(PixelMode::Rgb);
        assert_eq!(buffer.data, data);
    }

    #[test]
    fn test_rgb_to_rgba_adds_opaque_alpha() {
        let mut buffer = rgb_buffer(vec![0.1, 0.2, 0.3], 1, 1);
        buffer.convert(PixelMode::Rgba);
        assert_eq!(buffer.mode, PixelMode::Rgba);
        assert_eq!(buffer.data, vec![0.1, 0.2, 0.3, 1.0]);
    }

    #[test]
    fn test_rgba_round_trip_drops_alpha() {
        let mut buffer = ImageBuffer {
            width: 1,
            height: 1,
            mode: PixelMode::Rgba,
            data: vec![0.5, 0.25, 0.75, 0.5],
            depth: SampleDepth::Eight,
            source_format: ImageFormat::Png,
        };
        buffer.convert(PixelMode::Rgb);
        buffer.convert(PixelMode::Rgba);
        assert_eq!(buffer.data, vec![0.5, 0.25, 0.75, 1.0]);
    }

    #[test]
    fn test_rgb_hsv_round_trip() {
        let original = vec![0.8, 0.2, 0.4, 0.1, 0.9, 0.3];
        let mut buffer = rgb_buffer(original.clone(), 2, 1);
        buffer.convert(PixelMode::Hsv);
        assert_eq!(buffer.mode, PixelMode::Hsv);
        buffer.convert(PixelMode::Rgb);
        for (got, want) in buffer.data.iter().zip(original.iter()) {
            assert!((got - want).abs() < 1e-5, "{} != {}", got, want);
        }
    }

    #[test]
    fn test_luma_conversion_uses_bt601() {
        let mut buffer = rgb_buffer(vec![1.0, 0.0, 0.0], 1, 1);
        buffer.convert(PixelMode::Luma);
        assert!((buffer.data[0] - 0.299).abs() < 1e-5);
    }

    #[test]
    fn test_channel_plane_extraction() {
        let buffer = rgb_buffer(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 2, 1);
        assert_eq!(buffer.channel_plane(0), vec![0.1, 0.4]);
        assert_eq!(buffer.channel_plane(2), vec![0.3, 0.6]);
    }

    #[test]
    fn test_nearest_mode_table() {
        use Channel::*;
        assert_eq!(nearest_mode_for(PixelMode::Rgb, Red).unwrap(), PixelMode::Rgb);
        assert_eq!(nearest_mode_for(PixelMode::Rgb, Alpha).unwrap(), PixelMode::Rgba);
        assert_eq!(nearest_mode_for(PixelMode::Rgb, Hue).unwrap(), PixelMode::Hsv);
        assert_eq!(nearest_mode_for(PixelMode::Rgb, Luminance).unwrap(), PixelMode::Luma);
        assert_eq!(nearest_mode_for(PixelMode::Rgba, Value).unwrap(), PixelMode::Hsv);
        assert_eq!(nearest_mode_for(PixelMode::Hsv, Green).unwrap(), PixelMode::Rgba);
        assert_eq!(nearest_mode_for(PixelMode::Hsv, Luminance).unwrap(), PixelMode::LumaA);
        assert_eq!(nearest_mode_for(PixelMode::Luma, Blue).unwrap(), PixelMode::Rgb);
        assert_eq!(nearest_mode_for(PixelMode::Luma, Alpha).unwrap(), PixelMode::Rgba);
        assert_eq!(nearest_mode_for(PixelMode::LumaA, Red).unwrap(), PixelMode::Rgba);
        assert_eq!(nearest_mode_for(PixelMode::LumaA, Saturation).unwrap(), PixelMode::Hsv);
    }
}
