//! Tokenizing the full argument list into an ordered list of stages.

use std::path::PathBuf;

use serde::Serialize;

use chanops_core::models::{PipelineOp, OPERATION_NAMES};

use super::command::{parse_command, OpKind};

/// One pipeline stage: the operations of a single command segment plus any
/// input/output path changes it makes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stage {
    /// New input image for this and later stages, if one was named
    pub input: Option<PathBuf>,

    /// New output destination for this and later stages, if one was named
    pub output: Option<PathBuf>,

    /// Channel operations, in the order written
    pub ops: Vec<PipelineOp>,

    /// `--no-clamp` appeared inside this segment
    #[serde(skip)]
    pub no_clamp: bool,

    /// `--debug` appeared inside this segment
    #[serde(skip)]
    pub debug: bool,
}

/// A fully parsed pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPipeline {
    pub stages: Vec<Stage>,

    /// `--no-clamp` appeared anywhere in the pipeline
    pub no_clamp: bool,

    /// `--debug` appeared anywhere in the pipeline
    pub debug: bool,
}

/// Parse the raw token list into ordered stages.
///
/// Tokens are split into command segments at operation keywords; each
/// segment is then parsed on its own. The first segment must start with an
/// operation keyword and must name an input image.
pub fn parse_pipeline(tokens: &[String]) -> Result<ParsedPipeline, String> {
    if tokens.is_empty() {
        return Err("No commands given".to_string());
    }

    let first_kind = OpKind::from_keyword(&tokens[0]).ok_or_else(|| {
        format!(
            "Unknown operation '{}'. Valid operations: {}",
            tokens[0],
            OPERATION_NAMES.join(", ")
        )
    })?;

    // Split at every operation keyword, mirroring the original grammar:
    // a keyword always starts a new command segment.
    let mut boundaries = vec![(0usize, first_kind)];
    for (i, token) in tokens.iter().enumerate().skip(1) {
        if let Some(kind) = OpKind::from_keyword(token) {
            boundaries.push((i, kind));
        }
    }
    boundaries.push((tokens.len(), first_kind)); // sentinel end

    let mut stages = Vec::new();
    let mut no_clamp = false;
    let mut debug = false;

    for (n, window) in boundaries.windows(2).enumerate() {
        let (start, kind) = window[0];
        let (end, _) = window[1];

        let stage = parse_command(kind, &tokens[start + 1..end], n == 0)?;
        no_clamp |= stage.no_clamp;
        debug |= stage.debug;
        stages.push(stage);
    }

    Ok(ParsedPipeline {
        stages,
        no_clamp,
        debug,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanops_core::models::{Channel, ClampMode, OpParam, Statistic};

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_invert_command() {
        let parsed = parse_pipeline(&tokens(&["invert", "input.png", "+r"])).unwrap();

        assert_eq!(parsed.stages.len(), 1);
        let stage = &parsed.stages[0];
        assert_eq!(stage.input, Some(PathBuf::from("input.png")));
        assert_eq!(stage.output, None);
        assert_eq!(
            stage.ops,
            vec![PipelineOp::Invert {
                channel: Channel::Red
            }]
        );
    }

    #[test]
    fn test_multi_letter_selector_expands_in_order() {
        let parsed = parse_pipeline(&tokens(&["invert", "input.png", "+rghl"])).unwrap();

        let channels: Vec<Channel> = parsed.stages[0].ops.iter().map(|op| op.channel()).collect();
        assert_eq!(
            channels,
            vec![
                Channel::Red,
                Channel::Green,
                Channel::Hue,
                Channel::Luminance
            ]
        );
    }

    #[test]
    fn test_chained_commands_split_at_keywords() {
        let parsed = parse_pipeline(&tokens(&[
            "invert", "input.png", "+rgb", "offset", "+r", "0.5", "-o", "output.png",
        ]))
        .unwrap();

        assert_eq!(parsed.stages.len(), 2);
        assert_eq!(parsed.stages[0].ops.len(), 3);
        assert_eq!(
            parsed.stages[1].ops,
            vec![PipelineOp::Offset {
                channel: Channel::Red,
                amount: 0.5
            }]
        );
        assert_eq!(parsed.stages[1].output, Some(PathBuf::from("output.png")));
    }

    #[test]
    fn test_offset_accepts_negative_values() {
        let parsed = parse_pipeline(&tokens(&["offset", "in.png", "+g", "-0.25"])).unwrap();
        assert_eq!(
            parsed.stages[0].ops,
            vec![PipelineOp::Offset {
                channel: Channel::Green,
                amount: -0.25
            }]
        );
    }

    #[test]
    fn test_threshold_with_keyword_value() {
        let parsed = parse_pipeline(&tokens(&["threshold", "in.png", "+l", "median"])).unwrap();
        assert_eq!(
            parsed.stages[0].ops,
            vec![PipelineOp::Threshold {
                channel: Channel::Luminance,
                cutoff: OpParam::Stat(Statistic::Median)
            }]
        );
    }

    #[test]
    fn test_clamp_takes_mode_and_value() {
        let parsed =
            parse_pipeline(&tokens(&["clamp", "in.png", "+v", "min", "0.8"])).unwrap();
        assert_eq!(
            parsed.stages[0].ops,
            vec![PipelineOp::Clamp {
                channel: Channel::Value,
                mode: ClampMode::Min,
                limit: OpParam::Value(0.8)
            }]
        );
    }

    #[test]
    fn test_long_channel_flags() {
        let parsed = parse_pipeline(&tokens(&["scale", "in.png", "--red", "2.0"])).unwrap();
        assert_eq!(
            parsed.stages[0].ops,
            vec![PipelineOp::Scale {
                channel: Channel::Red,
                factor: 2.0
            }]
        );
    }

    #[test]
    fn test_later_input_needs_flag() {
        let parsed = parse_pipeline(&tokens(&[
            "invert", "a.png", "+r", "invert", "-i", "b.png", "+g",
        ]))
        .unwrap();

        assert_eq!(parsed.stages[1].input, Some(PathBuf::from("b.png")));

        // A bare path in a later segment is an error
        let err =
            parse_pipeline(&tokens(&["invert", "a.png", "+r", "invert", "b.png", "+g"]))
                .unwrap_err();
        assert!(err.contains("Unexpected token"), "{}", err);
    }

    #[test]
    fn test_no_clamp_and_debug_flags_hoisted() {
        let parsed = parse_pipeline(&tokens(&[
            "invert",
            "in.png",
            "+r",
            "offset",
            "--no-clamp",
            "+g",
            "0.5",
        ]))
        .unwrap();
        assert!(parsed.no_clamp);
        assert!(!parsed.debug);

        let parsed = parse_pipeline(&tokens(&["invert", "in.png", "--debug", "+r"])).unwrap();
        assert!(parsed.debug);
    }

    #[test]
    fn test_error_cases() {
        // First token must be an operation
        assert!(parse_pipeline(&tokens(&["input.png", "invert", "+r"])).is_err());

        // First command must name an input
        let err = parse_pipeline(&tokens(&["invert", "+r"])).unwrap_err();
        assert!(err.contains("input image"), "{}", err);

        // Unknown channel letter
        let err = parse_pipeline(&tokens(&["invert", "in.png", "+rq"])).unwrap_err();
        assert!(err.contains("Unknown channel"), "{}", err);

        // Missing value
        let err = parse_pipeline(&tokens(&["offset", "in.png", "+r"])).unwrap_err();
        assert!(err.contains("requires 1 value"), "{}", err);

        // Bad clamp mode
        let err =
            parse_pipeline(&tokens(&["clamp", "in.png", "+r", "mid", "0.5"])).unwrap_err();
        assert!(err.contains("Invalid clamp mode"), "{}", err);

        // Bad numeric value
        let err = parse_pipeline(&tokens(&["scale", "in.png", "+r", "fast"])).unwrap_err();
        assert!(err.contains("Invalid scale value"), "{}", err);

        // Statistic keywords are not valid for offset
        assert!(parse_pipeline(&tokens(&["offset", "in.png", "+r", "mean"])).is_err());

        // Empty token list
        assert!(parse_pipeline(&[]).is_err());
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let parsed = parse_pipeline(&tokens(&["Invert", "in.png", "+R"])).unwrap();
        assert_eq!(
            parsed.stages[0].ops,
            vec![PipelineOp::Invert {
                channel: Channel::Red
            }]
        );
    }
}
