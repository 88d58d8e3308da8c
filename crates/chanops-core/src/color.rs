//! Color transformations between the supported pixel modes.
//!
//! Provides RGB <-> HSV conversions and luminance computation. All values
//! live in the normalized [0,1] space; hue is expressed as a fraction of
//! the color circle rather than degrees so that channel operations treat
//! it like any other channel.

/// HSV color representation
/// - H (hue): 0.0-1.0, fraction of the color circle
/// - S (saturation): 0.0-1.0
/// - V (value): 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

/// Convert RGB to HSV
///
/// Input: RGB values in range 0.0-1.0
/// Output: HSV with all components in 0.0-1.0
#[inline]
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> Hsv {
    let r = r.clamp(0.0, 1.0);
    let g = g.clamp(0.0, 1.0);
    let b = b.clamp(0.0, 1.0);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;

    // Achromatic case
    if delta < 1e-6 {
        return Hsv { h: 0.0, s: 0.0, v };
    }

    let s = delta / max;

    // Hue as a fraction of a full turn
    let h = if (max - r).abs() < 1e-6 {
        let mut h = (g - b) / delta;
        if g < b {
            h += 6.0;
        }
        h / 6.0
    } else if (max - g).abs() < 1e-6 {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };

    Hsv { h: h % 1.0, s, v }
}

/// Convert HSV to RGB
///
/// Input: HSV with all components in 0.0-1.0 (hue is a fraction of a turn)
/// Output: RGB values in range 0.0-1.0
#[inline]
pub fn hsv_to_rgb(hsv: Hsv) -> (f32, f32, f32) {
    let Hsv { h, s, v } = hsv;
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);

    if s < 1e-6 {
        return (v, v, v);
    }

    // Wrap hue into [0,1) and scale to one of six sectors
    let h = (h.rem_euclid(1.0)) * 6.0;
    let sector = h.floor() as u32 % 6;
    let f = h - h.floor();

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Compute luminance from RGB using ITU-R BT.601 weights, the convention
/// the original tool inherited from its imaging library.
#[inline]
pub fn rgb_to_luma(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}
