//! Image decoders for the supported container formats.
//!
//! Support for PNG and TIFF files. Images decode into normalized f32
//! buffers keeping their native channel layout and bit depth, so an
//! unmodified pipeline can re-encode them with identical samples.

use std::path::Path;

use crate::buffer::ImageBuffer;
use crate::models::{ImageFormat, PixelMode, SampleDepth};

/// Decode an image from a file path
pub fn decode_image<P: AsRef<Path>>(path: P) -> Result<ImageBuffer, String> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| "No file extension found".to_string())?;

    match ImageFormat::from_extension(&extension) {
        Some(ImageFormat::Png) => decode_png(path),
        Some(ImageFormat::Tiff) => decode_tiff(path),
        None => Err(format!("Unsupported file format: {}", extension)),
    }
}

/// Decode a PNG file
fn decode_png<P: AsRef<Path>>(path: P) -> Result<ImageBuffer, String> {
    use std::fs::File;
    use std::io::BufReader;

    let file = File::open(path.as_ref()).map_err(|e| format!("Failed to open PNG file: {}", e))?;
    let decoder = png::Decoder::new(BufReader::new(file));
    let mut reader = decoder
        .read_info()
        .map_err(|e| format!("Failed to read PNG info: {}", e))?;

    let width = reader.info().width;
    let height = reader.info().height;

    // Allocate buffer for image data
    let buffer_size = reader
        .output_buffer_size()
        .ok_or_else(|| "Failed to determine PNG buffer size".to_string())?;
    let mut buf = vec![0u8; buffer_size];
    let frame_info = reader
        .next_frame(&mut buf)
        .map_err(|e| format!("Failed to read PNG frame: {}", e))?;

    // Get the actual bytes used
    let bytes = &buf[..frame_info.buffer_size()];

    // Color type and depth after the decoder's output transformations
    let (color_type, bit_depth) = reader.output_color_type();

    let mode = match color_type {
        png::ColorType::Grayscale => PixelMode::Luma,
        png::ColorType::GrayscaleAlpha => PixelMode::LumaA,
        png::ColorType::Rgb => PixelMode::Rgb,
        png::ColorType::Rgba => PixelMode::Rgba,
        png::ColorType::Indexed => {
            return Err("Indexed PNG not supported".to_string());
        }
    };

    let (data, depth) = match bit_depth {
        png::BitDepth::Eight => (normalize_u8(bytes), SampleDepth::Eight),
        png::BitDepth::Sixteen => (normalize_u16_be(bytes), SampleDepth::Sixteen),
        other => {
            return Err(format!("Unsupported PNG bit depth: {:?}", other));
        }
    };

    let expected_len = (width as usize) * (height as usize) * mode.channel_count();
    if data.len() != expected_len {
        return Err(format!(
            "PNG buffer size mismatch: expected {}, got {}",
            expected_len,
            data.len()
        ));
    }

    Ok(ImageBuffer {
        width,
        height,
        mode,
        data,
        depth,
        source_format: ImageFormat::Png,
    })
}

/// Decode a TIFF file
fn decode_tiff<P: AsRef<Path>>(path: P) -> Result<ImageBuffer, String> {
    use std::fs::File;
    use std::io::BufReader;
    use tiff::decoder::Limits;

    let file = File::open(path.as_ref()).map_err(|e| format!("Failed to open TIFF file: {}", e))?;

    // Configure limits for large scans (up to 1GB uncompressed)
    let mut limits = Limits::default();
    limits.decoding_buffer_size = 1024 * 1024 * 1024;
    limits.ifd_value_size = 1024 * 1024 * 1024;
    limits.intermediate_buffer_size = 1024 * 1024 * 1024;

    let mut decoder = tiff::decoder::Decoder::new(BufReader::new(file))
        .map_err(|e| format!("Failed to create TIFF decoder: {}", e))?
        .with_limits(limits);

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| format!("Failed to get TIFF dimensions: {}", e))?;

    let color_type = decoder
        .colortype()
        .map_err(|e| format!("Failed to get TIFF color type: {}", e))?;

    let (mode, bits) = match color_type {
        tiff::ColorType::Gray(bits) => (PixelMode::Luma, bits),
        tiff::ColorType::RGB(bits) => (PixelMode::Rgb, bits),
        tiff::ColorType::RGBA(bits) => (PixelMode::Rgba, bits),
        tiff::ColorType::GrayA(_) => {
            return Err("Gray+alpha TIFF not supported".to_string());
        }
        tiff::ColorType::CMYK(_) => return Err("CMYK color type not supported".to_string()),
        tiff::ColorType::YCbCr(_) => return Err("YCbCr color type not supported".to_string()),
        tiff::ColorType::Palette(_) => return Err("Palette color type not supported".to_string()),
        other => return Err(format!("Unknown TIFF color type: {:?}", other)),
    };

    let depth = match bits {
        8 => SampleDepth::Eight,
        16 => SampleDepth::Sixteen,
        other => return Err(format!("Unsupported TIFF bit depth: {}", other)),
    };

    let image_data = decoder
        .read_image()
        .map_err(|e| format!("Failed to read TIFF image data: {}", e))?;

    let data = match image_data {
        tiff::decoder::DecodingResult::U8(buf) => buf.iter().map(|&v| v as f32 / 255.0).collect(),
        tiff::decoder::DecodingResult::U16(buf) => {
            buf.iter().map(|&v| v as f32 / 65535.0).collect::<Vec<f32>>()
        }
        _ => {
            return Err("Only 8-bit and 16-bit unsigned TIFF samples are supported".to_string());
        }
    };

    let expected_len = (width as usize) * (height as usize) * mode.channel_count();
    if data.len() != expected_len {
        return Err(format!(
            "TIFF buffer size mismatch: expected {}, got {}",
            expected_len,
            data.len()
        ));
    }

    Ok(ImageBuffer {
        width,
        height,
        mode,
        data,
        depth,
        source_format: ImageFormat::Tiff,
    })
}

/// Normalize 8-bit samples to f32 in [0,1]
fn normalize_u8(bytes: &[u8]) -> Vec<f32> {
    bytes.iter().map(|&v| v as f32 / 255.0).collect()
}

/// Normalize big-endian 16-bit samples to f32 in [0,1]
fn normalize_u16_be(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|chunk| {
            let val16 = u16::from_be_bytes([chunk[0], chunk[1]]);
            val16 as f32 / 65535.0
        })
        .collect()
}
