//! Parsing for a single command segment of the pipeline grammar.

use std::path::PathBuf;
use std::str::FromStr;

use chanops_core::models::{Channel, ClampMode, OpParam, PipelineOp};

use super::pipeline::Stage;

/// Operation keywords and their value arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpKind {
    Invert,
    Offset,
    Scale,
    Threshold,
    Clamp,
}

impl OpKind {
    /// Look up an operation from its (case-insensitive) keyword
    pub(crate) fn from_keyword(s: &str) -> Option<OpKind> {
        match s.to_lowercase().as_str() {
            "invert" => Some(Self::Invert),
            "offset" => Some(Self::Offset),
            "scale" => Some(Self::Scale),
            "threshold" => Some(Self::Threshold),
            "clamp" => Some(Self::Clamp),
            _ => None,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Invert => "invert",
            Self::Offset => "offset",
            Self::Scale => "scale",
            Self::Threshold => "threshold",
            Self::Clamp => "clamp",
        }
    }

    /// Number of value tokens expected after a channel selector
    fn value_arity(&self) -> usize {
        match self {
            Self::Invert => 0,
            Self::Offset | Self::Scale | Self::Threshold => 1,
            Self::Clamp => 2,
        }
    }
}

/// Parse one command segment (the tokens between two operation keywords).
///
/// The first command of a pipeline takes its input as a bare positional;
/// later commands switch input only through `-i/--input`.
pub(crate) fn parse_command(
    kind: OpKind,
    args: &[String],
    need_positional_input: bool,
) -> Result<Stage, String> {
    let mut stage = Stage {
        input: None,
        output: None,
        ops: Vec::new(),
        no_clamp: false,
        debug: false,
    };

    let mut i = 0;
    while i < args.len() {
        let token = args[i].as_str();
        match token {
            "-i" | "--input" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{} expects a file path", token))?;
                stage.input = Some(PathBuf::from(value));
                i += 1;
            }
            "-o" | "--output" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{} expects a file path", token))?;
                stage.output = Some(PathBuf::from(value));
                i += 1;
            }
            "-no" | "--no-clamp" => stage.no_clamp = true,
            "--debug" => stage.debug = true,
            t if t.starts_with('+') && t.len() > 1 => {
                let channels = parse_channel_selector(&t[1..])?;
                let values = take_values(kind, args, &mut i)?;
                for channel in channels {
                    stage.ops.push(build_op(kind, channel, &values)?);
                }
            }
            t if t.starts_with("--") => {
                let channel = Channel::from_str(&t[2..])?;
                let values = take_values(kind, args, &mut i)?;
                stage.ops.push(build_op(kind, channel, &values)?);
            }
            t if need_positional_input && stage.input.is_none() && !t.starts_with('-') => {
                stage.input = Some(PathBuf::from(t));
            }
            t => {
                return Err(format!(
                    "Unexpected token '{}' in {} command",
                    t,
                    kind.name()
                ));
            }
        }
        i += 1;
    }

    if need_positional_input && stage.input.is_none() {
        return Err("The first command must name an input image".to_string());
    }

    Ok(stage)
}

/// Consume the value tokens an operation expects after its selector
fn take_values<'a>(
    kind: OpKind,
    args: &'a [String],
    i: &mut usize,
) -> Result<Vec<&'a str>, String> {
    let arity = kind.value_arity();
    let mut values = Vec::with_capacity(arity);
    for _ in 0..arity {
        *i += 1;
        let value = args.get(*i).ok_or_else(|| {
            format!(
                "The {} operation requires {} value(s) after the channel selector",
                kind.name(),
                arity
            )
        })?;
        values.push(value.as_str());
    }
    Ok(values)
}

/// Expand a `+rgb`-style selector into individual channels, in the order written
fn parse_channel_selector(selector: &str) -> Result<Vec<Channel>, String> {
    if selector.is_empty() {
        return Err("Empty channel selector".to_string());
    }
    selector
        .chars()
        .map(|c| {
            Channel::from_shorthand(c)
                .ok_or_else(|| format!("Unknown channel '{}' in selector '+{}'", c, selector))
        })
        .collect()
}

/// Build one pipeline operation from a channel and its value tokens
fn build_op(kind: OpKind, channel: Channel, values: &[&str]) -> Result<PipelineOp, String> {
    match kind {
        OpKind::Invert => Ok(PipelineOp::Invert { channel }),
        OpKind::Offset => {
            let amount = values[0]
                .parse::<f32>()
                .map_err(|_| format!("Invalid offset value: '{}'", values[0]))?;
            Ok(PipelineOp::Offset { channel, amount })
        }
        OpKind::Scale => {
            let factor = values[0]
                .parse::<f32>()
                .map_err(|_| format!("Invalid scale value: '{}'", values[0]))?;
            Ok(PipelineOp::Scale { channel, factor })
        }
        OpKind::Threshold => {
            let cutoff = values[0].parse::<OpParam>()?;
            Ok(PipelineOp::Threshold { channel, cutoff })
        }
        OpKind::Clamp => {
            let mode = values[0].parse::<ClampMode>()?;
            let limit = values[1].parse::<OpParam>()?;
            Ok(PipelineOp::Clamp {
                channel,
                mode,
                limit,
            })
        }
    }
}
