//! Shared data types for the channel-operation pipeline.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Canonical list of operation keywords recognized by the CLI grammar.
pub const OPERATION_NAMES: &[&str] = &["invert", "offset", "clamp", "scale", "threshold"];

/// Pixel layouts the tool can hold in memory.
///
/// `Hsv` is a working mode only: channel operations may convert an image
/// into it, but files never decode to or encode from HSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PixelMode {
    /// Single luminance channel (L)
    Luma,

    /// Luminance plus alpha (LA)
    LumaA,

    /// Red, green, blue (RGB)
    Rgb,

    /// Red, green, blue, alpha (RGBA)
    Rgba,

    /// Hue, saturation, value (HSV); hue is stored as a fraction of the
    /// circle so every channel lives in the same normalized [0,1] space
    Hsv,
}

impl PixelMode {
    /// Number of interleaved samples per pixel in this mode
    pub fn channel_count(&self) -> usize {
        self.channels().len()
    }

    /// Channel layout, in interleave order
    pub fn channels(&self) -> &'static [Channel] {
        match self {
            Self::Luma => &[Channel::Luminance],
            Self::LumaA => &[Channel::Luminance, Channel::Alpha],
            Self::Rgb => &[Channel::Red, Channel::Green, Channel::Blue],
            Self::Rgba => &[Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha],
            Self::Hsv => &[Channel::Hue, Channel::Saturation, Channel::Value],
        }
    }

    /// Index of a channel within this mode's interleave order, if present
    pub fn channel_index(&self, channel: Channel) -> Option<usize> {
        self.channels().iter().position(|&c| c == channel)
    }

    /// Whether this mode carries the given channel
    pub fn has_channel(&self, channel: Channel) -> bool {
        self.channel_index(channel).is_some()
    }

    /// Short mode name used in log and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Luma => "L",
            Self::LumaA => "LA",
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
            Self::Hsv => "HSV",
        }
    }
}

/// Color channels that operations can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Hue,
    Saturation,
    Value,
    Red,
    Green,
    Blue,
    Alpha,
    Luminance,
}

impl Channel {
    /// All supported channels with their one-letter shorthands
    pub const ALL: &'static [Channel] = &[
        Channel::Hue,
        Channel::Saturation,
        Channel::Value,
        Channel::Red,
        Channel::Green,
        Channel::Blue,
        Channel::Alpha,
        Channel::Luminance,
    ];

    /// One-letter shorthand used in `+x` channel selectors
    pub fn shorthand(&self) -> char {
        match self {
            Self::Hue => 'h',
            Self::Saturation => 's',
            Self::Value => 'v',
            Self::Red => 'r',
            Self::Green => 'g',
            Self::Blue => 'b',
            Self::Alpha => 'a',
            Self::Luminance => 'l',
        }
    }

    /// Long channel name used in `--name` flags and messages
    pub fn long_name(&self) -> &'static str {
        match self {
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Value => "value",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Alpha => "alpha",
            Self::Luminance => "luminance",
        }
    }

    /// Look up a channel from its one-letter shorthand
    pub fn from_shorthand(c: char) -> Option<Channel> {
        Channel::ALL
            .iter()
            .copied()
            .find(|ch| ch.shorthand() == c.to_ascii_lowercase())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        if lower.len() == 1 {
            if let Some(c) = lower.chars().next() {
                if let Some(channel) = Channel::from_shorthand(c) {
                    return Ok(channel);
                }
            }
        }
        Channel::ALL
            .iter()
            .copied()
            .find(|ch| ch.long_name() == lower)
            .ok_or_else(|| format!("Unknown channel: '{}'", s))
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.long_name())
    }
}

/// Bit depth of the source samples, remembered so an unmodified pipeline
/// re-encodes the image with identical sample values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleDepth {
    Eight,
    Sixteen,
}

impl SampleDepth {
    /// Largest sample value at this depth, as f32
    pub fn max_value(&self) -> f32 {
        match self {
            Self::Eight => 255.0,
            Self::Sixteen => 65535.0,
        }
    }
}

/// Container formats the tool can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Tiff,
}

impl ImageFormat {
    /// Map a file extension to a container format
    pub fn from_extension(ext: &str) -> Option<ImageFormat> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }
}

/// Direction of a clamp operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClampMode {
    /// x = min(x, limit): cap values at the limit
    Min,

    /// x = max(x, limit): raise values to at least the limit
    Max,
}

impl FromStr for ClampMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            _ => Err(format!("Invalid clamp mode: '{}'. Valid options: min, max", s)),
        }
    }
}

/// Statistics that threshold and clamp accept in place of a literal value.
/// Evaluated over the target channel after any mode conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Mean,
    Median,
    Min,
    Max,
    Sum,
    Std,
}

impl FromStr for Statistic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "sum" => Ok(Self::Sum),
            "std" => Ok(Self::Std),
            _ => Err(format!("Unknown statistic: '{}'", s)),
        }
    }
}

/// A numeric parameter: either a literal value or a statistic keyword
/// resolved against the channel being operated on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpParam {
    Value(f32),
    Stat(Statistic),
}

impl FromStr for OpParam {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(value) = s.parse::<f32>() {
            return Ok(Self::Value(value));
        }
        Statistic::from_str(s).map(Self::Stat).map_err(|_| {
            format!(
                "Invalid value '{}': expected a number or one of mean, median, min, max, sum, std",
                s
            )
        })
    }
}

/// A single parsed channel operation.
///
/// All operations work in the normalized [0,1] value space; the target
/// channel is clamped back into that range afterwards unless auto-clamp
/// has been disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PipelineOp {
    /// x = 1 - x
    Invert { channel: Channel },

    /// x = x + amount
    Offset { channel: Channel, amount: f32 },

    /// x = x * factor
    Scale { channel: Channel, factor: f32 },

    /// x = 0 if x < cutoff else 1
    Threshold { channel: Channel, cutoff: OpParam },

    /// x = min(x, limit) or x = max(x, limit) depending on mode
    Clamp {
        channel: Channel,
        mode: ClampMode,
        limit: OpParam,
    },
}

impl PipelineOp {
    /// Channel this operation targets
    pub fn channel(&self) -> Channel {
        match self {
            Self::Invert { channel }
            | Self::Offset { channel, .. }
            | Self::Scale { channel, .. }
            | Self::Threshold { channel, .. }
            | Self::Clamp { channel, .. } => *channel,
        }
    }

    /// Operation keyword, as written on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Self::Invert { .. } => "invert",
            Self::Offset { .. } => "offset",
            Self::Scale { .. } => "scale",
            Self::Threshold { .. } => "threshold",
            Self::Clamp { .. } => "clamp",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parsing_accepts_shorthand_and_long_names() {
        assert_eq!("r".parse::<Channel>().unwrap(), Channel::Red);
        assert_eq!("HUE".parse::<Channel>().unwrap(), Channel::Hue);
        assert_eq!("luminance".parse::<Channel>().unwrap(), Channel::Luminance);
        assert!("x".parse::<Channel>().is_err());
        assert!("chroma".parse::<Channel>().is_err());
    }

    #[test]
    fn test_mode_channel_index() {
        assert_eq!(PixelMode::Rgba.channel_index(Channel::Alpha), Some(3));
        assert_eq!(PixelMode::Hsv.channel_index(Channel::Saturation), Some(1));
        assert_eq!(PixelMode::Rgb.channel_index(Channel::Hue), None);
        assert_eq!(PixelMode::Luma.channel_count(), 1);
    }

    #[test]
    fn test_op_param_parsing() {
        assert_eq!("0.5".parse::<OpParam>().unwrap(), OpParam::Value(0.5));
        assert_eq!(
            "median".parse::<OpParam>().unwrap(),
            OpParam::Stat(Statistic::Median)
        );
        assert!("half".parse::<OpParam>().is_err());
    }

    #[test]
    fn test_clamp_mode_parsing() {
        assert_eq!("min".parse::<ClampMode>().unwrap(), ClampMode::Min);
        assert_eq!("MAX".parse::<ClampMode>().unwrap(), ClampMode::Max);
        assert!("mid".parse::<ClampMode>().is_err());
    }
}
