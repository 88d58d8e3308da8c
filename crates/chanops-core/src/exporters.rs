//! Image exporters for the supported container formats.
//!
//! Images are written back at their source bit depth. The container is
//! chosen from the output extension, falling back to the format the image
//! was decoded from, so a bare pipeline reproduces the input exactly.

use std::path::Path;

use crate::buffer::ImageBuffer;
use crate::models::{ImageFormat, PixelMode, SampleDepth};

/// Export an image buffer to a file.
///
/// The buffer must be in a file mode (HSV is working-only); callers render
/// through the executor first.
pub fn export_image<P: AsRef<Path>>(image: &ImageBuffer, path: P) -> Result<(), String> {
    let path = path.as_ref();

    if image.mode == PixelMode::Hsv {
        return Err("HSV buffers cannot be encoded; render to a file mode first".to_string());
    }

    let format = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .unwrap_or(image.source_format);

    match format {
        ImageFormat::Png => export_png(image, path),
        ImageFormat::Tiff => export_tiff(image, path),
    }
}

/// Quantize normalized samples to 8-bit
fn quantize_u8(data: &[f32]) -> Vec<u8> {
    data.iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect()
}

/// Quantize normalized samples to 16-bit
fn quantize_u16(data: &[f32]) -> Vec<u16> {
    data.iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 65535.0).round() as u16)
        .collect()
}

/// Export to PNG at the source bit depth
fn export_png(image: &ImageBuffer, path: &Path) -> Result<(), String> {
    use std::fs::File;
    use std::io::BufWriter;

    let color = match image.mode {
        PixelMode::Luma => png::ColorType::Grayscale,
        PixelMode::LumaA => png::ColorType::GrayscaleAlpha,
        PixelMode::Rgb => png::ColorType::Rgb,
        PixelMode::Rgba => png::ColorType::Rgba,
        PixelMode::Hsv => unreachable!("checked by export_image"),
    };

    let file =
        File::create(path).map_err(|e| format!("Failed to create PNG file: {}", e))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, image.width, image.height);
    encoder.set_color(color);
    encoder.set_depth(match image.depth {
        SampleDepth::Eight => png::BitDepth::Eight,
        SampleDepth::Sixteen => png::BitDepth::Sixteen,
    });

    let mut writer = encoder
        .write_header()
        .map_err(|e| format!("Failed to write PNG header: {}", e))?;

    let bytes = match image.depth {
        SampleDepth::Eight => quantize_u8(&image.data),
        SampleDepth::Sixteen => {
            // PNG 16-bit is big-endian
            quantize_u16(&image.data)
                .into_iter()
                .flat_map(|v| v.to_be_bytes())
                .collect()
        }
    };

    writer
        .write_image_data(&bytes)
        .map_err(|e| format!("Failed to write PNG image data: {}", e))?;

    Ok(())
}

/// Export to TIFF at the source bit depth
fn export_tiff(image: &ImageBuffer, path: &Path) -> Result<(), String> {
    use std::fs::File;
    use std::io::BufWriter;
    use tiff::encoder::colortype;

    let file =
        File::create(path).map_err(|e| format!("Failed to create TIFF file: {}", e))?;
    let writer = BufWriter::new(file);

    let mut encoder = tiff::encoder::TiffEncoder::new(writer)
        .map_err(|e| format!("Failed to create TIFF encoder: {}", e))?;

    match (image.mode, image.depth) {
        (PixelMode::Luma, SampleDepth::Eight) => encoder
            .write_image::<colortype::Gray8>(image.width, image.height, &quantize_u8(&image.data))
            .map_err(|e| format!("Failed to write TIFF image: {}", e))?,
        (PixelMode::Luma, SampleDepth::Sixteen) => encoder
            .write_image::<colortype::Gray16>(image.width, image.height, &quantize_u16(&image.data))
            .map_err(|e| format!("Failed to write TIFF image: {}", e))?,
        (PixelMode::Rgb, SampleDepth::Eight) => encoder
            .write_image::<colortype::RGB8>(image.width, image.height, &quantize_u8(&image.data))
            .map_err(|e| format!("Failed to write TIFF image: {}", e))?,
        (PixelMode::Rgb, SampleDepth::Sixteen) => encoder
            .write_image::<colortype::RGB16>(image.width, image.height, &quantize_u16(&image.data))
            .map_err(|e| format!("Failed to write TIFF image: {}", e))?,
        (PixelMode::Rgba, SampleDepth::Eight) => encoder
            .write_image::<colortype::RGBA8>(image.width, image.height, &quantize_u8(&image.data))
            .map_err(|e| format!("Failed to write TIFF image: {}", e))?,
        (PixelMode::Rgba, SampleDepth::Sixteen) => encoder
            .write_image::<colortype::RGBA16>(image.width, image.height, &quantize_u16(&image.data))
            .map_err(|e| format!("Failed to write TIFF image: {}", e))?,
        (PixelMode::LumaA, _) => {
            return Err("Gray+alpha TIFF export not supported".to_string());
        }
        (PixelMode::Hsv, _) => unreachable!("checked by export_image"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoders::decode_image;

    fn make_buffer(mode: PixelMode, depth: SampleDepth, data: Vec<f32>, width: u32) -> ImageBuffer {
        let height = (data.len() / mode.channel_count() / width as usize) as u32;
        ImageBuffer {
            width,
            height,
            mode,
            data,
            depth,
            source_format: ImageFormat::Png,
        }
    }

    #[test]
    fn test_quantize_round_trips_8bit_levels() {
        // Every 8-bit level survives normalize -> quantize unchanged
        let levels: Vec<f32> = (0u16..=255).map(|v| v as f32 / 255.0).collect();
        let quantized = quantize_u8(&levels);
        for (i, &q) in quantized.iter().enumerate() {
            assert_eq!(q as usize, i);
        }
    }

    #[test]
    fn test_png_export_decode_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.png");

        let buffer = make_buffer(
            PixelMode::Rgb,
            SampleDepth::Eight,
            vec![0.0, 0.5, 1.0, 0.25, 0.75, 0.125],
            2,
        );
        export_image(&buffer, &path).unwrap();

        let decoded = decode_image(&path).unwrap();
        assert_eq!(decoded.mode, PixelMode::Rgb);
        assert_eq!(decoded.depth, SampleDepth::Eight);
        assert_eq!(decoded.width, 2);
        assert_eq!(decoded.height, 1);

        // Samples survive the quantize/normalize cycle to within one level.
        // 0.5 quantizes to 128 with an error of exactly half a level, so the
        // bound must not sit on the half-level boundary itself.
        for (got, want) in decoded.data.iter().zip(buffer.data.iter()) {
            assert!((got - want).abs() < 1.0 / 255.0, "{} vs {}", got, want);
        }
    }

    #[test]
    fn test_unmodified_reencode_is_bit_identical() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.png");
        let second = dir.path().join("second.png");

        let buffer = make_buffer(
            PixelMode::Rgba,
            SampleDepth::Sixteen,
            vec![0.1, 0.2, 0.3, 0.4, 0.9, 0.8, 0.7, 0.6],
            2,
        );
        export_image(&buffer, &first).unwrap();

        // Decode and re-encode with no operations applied
        let decoded = decode_image(&first).unwrap();
        assert_eq!(decoded.mode, PixelMode::Rgba);
        assert_eq!(decoded.depth, SampleDepth::Sixteen);
        export_image(&decoded, &second).unwrap();

        let a = std::fs::read(&first).unwrap();
        let b = std::fs::read(&second).unwrap();
        assert_eq!(a, b, "re-encoded file should be bit-identical");
    }

    #[test]
    fn test_tiff_round_trip_gray16() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.tif");

        let mut buffer = make_buffer(
            PixelMode::Luma,
            SampleDepth::Sixteen,
            vec![0.0, 0.25, 0.5, 1.0],
            2,
        );
        buffer.source_format = ImageFormat::Tiff;
        export_image(&buffer, &path).unwrap();

        let decoded = decode_image(&path).unwrap();
        assert_eq!(decoded.mode, PixelMode::Luma);
        assert_eq!(decoded.depth, SampleDepth::Sixteen);
        for (got, want) in decoded.data.iter().zip(buffer.data.iter()) {
            assert!((got - want).abs() < 1.0 / 65535.0);
        }
    }

    #[test]
    fn test_hsv_buffer_is_rejected() {
        let buffer = make_buffer(PixelMode::Hsv, SampleDepth::Eight, vec![0.0, 0.5, 1.0], 1);
        let err = export_image(&buffer, "out.png").unwrap_err();
        assert!(err.contains("HSV"), "{}", err);
    }

    #[test]
    fn test_extension_fallback_uses_source_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.img");

        let buffer = make_buffer(PixelMode::Luma, SampleDepth::Eight, vec![0.5], 1);
        // Unknown extension falls back to the source container (PNG here)
        export_image(&buffer, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
