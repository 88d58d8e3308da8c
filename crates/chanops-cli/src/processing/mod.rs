//! Stage running: input/output resolution and pipeline execution.

use std::path::PathBuf;

use chanops_core::decoders::decode_image;
use chanops_core::exporters::export_image;
use chanops_core::pipeline::{Executor, PipelineOptions};
use chanops_core::verbose_println;

use crate::parsers::ParsedPipeline;

/// Run every stage of a parsed pipeline.
///
/// The first stage decodes its input image; later stages may switch input
/// with `-i`. After each stage the working image is written to the stage's
/// effective destination: the most recently named output, or the current
/// input path when no output has been given (the input is overwritten).
///
/// Returns the paths written, one per stage.
pub fn run_stages(
    parsed: &ParsedPipeline,
    options: &PipelineOptions,
) -> Result<Vec<PathBuf>, String> {
    let mut executor: Option<Executor> = None;
    let mut current_input: Option<PathBuf> = None;
    let mut current_output: Option<PathBuf> = None;
    let mut written = Vec::new();

    for stage in &parsed.stages {
        if let Some(input) = &stage.input {
            if !input.exists() {
                return Err(format!("Input file {} does not exist", input.display()));
            }
            verbose_println!("[chanops] Decoding {}", input.display());
            let buffer = decode_image(input)?;
            match executor.as_mut() {
                Some(exec) => exec.load(buffer),
                None => {
                    let mut exec = Executor::new(buffer);
                    exec.set_auto_clamp(options.auto_clamp);
                    executor = Some(exec);
                }
            }
            current_input = Some(input.clone());
        }

        let exec = executor
            .as_mut()
            .ok_or_else(|| "No input image specified".to_string())?;

        if let Some(output) = &stage.output {
            current_output = Some(output.clone());
        }

        for op in &stage.ops {
            verbose_println!("[chanops] Applying {} on '{}'", op.name(), op.channel());
            exec.apply(op)?;
        }

        let destination = current_output
            .clone()
            .or_else(|| current_input.clone())
            .ok_or_else(|| "No input image specified".to_string())?;

        let rendered = exec.render();
        export_image(&rendered, &destination)?;
        written.push(destination);
    }

    Ok(written)
}
