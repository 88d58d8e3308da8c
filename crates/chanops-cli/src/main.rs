use clap::Parser;

use chanops_cli::{parse_pipeline, run_stages};
use chanops_core::pipeline::PipelineOptions;

const LONG_ABOUT: &str = "\
Perform arithmetic operations on the color channels of an image. Operations
are applied in the order given, regardless of the base image format: if a
grayscale image is asked to invert -rghl, it is converted to RGB, then HSV,
then back to grayscale as each channel comes up. Output is always saved in
the input's channel format.

The input image is named once, as the first command's positional argument;
later commands switch input with -i. If no output is given with -o, the
input image is overwritten; once an output has been named it is used for
the current and following commands.

All channel operations work in the normalized space between 0 and 1, and
the affected channel is clamped back into that range after each operation.
Use --no-clamp to let intermediate values escape the range.

Channels: h(ue) s(aturation) v(alue) r(ed) g(reen) b(lue) a(lpha)
l(uminance). A selector such as +rgb applies the operation to each listed
channel in order.

Operations:
  invert +c                 x = 1 - x
  offset +c VALUE           x = x + y
  scale +c VALUE            x = x * y
  threshold +c VALUE        x = 0 if x < y else 1
  clamp +c {min,max} VALUE  x = min(x, y) or x = max(x, y)

threshold and clamp also accept the statistic keywords mean, median, min,
max, sum, and std in place of a literal value; they are evaluated over the
channel being operated on.

Example:
  chanops invert input.png +rgb offset +r 0.5 -o output.png

This inverts the RGB channels of input.png, saves the result back to
input.png, then offsets the red channel by half and saves to output.png.";

#[derive(Parser)]
#[command(name = "chanops")]
#[command(version, about = "Per-channel arithmetic operations on raster images")]
#[command(long_about = LONG_ABOUT)]
struct Cli {
    /// Disable the default clamping of channels to [0,1] between operations
    #[arg(long = "no-clamp")]
    no_clamp: bool,

    /// Print debug information
    #[arg(long)]
    debug: bool,

    /// Pipeline tokens: OPERATION [INPUT] [+CHANNELS [VALUE...]] [-o OUTPUT] ...
    #[arg(
        value_name = "TOKENS",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    tokens: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let parsed = parse_pipeline(&cli.tokens)?;

    let debug = cli.debug || parsed.debug;
    chanops_core::config::set_verbose(debug);
    chanops_core::config::log_config_usage();

    let auto_clamp = if cli.no_clamp || parsed.no_clamp {
        false
    } else {
        chanops_core::config::default_auto_clamp()
    };

    if debug {
        let json = serde_json::to_string_pretty(&parsed.stages)
            .map_err(|e| format!("Failed to serialize pipeline: {}", e))?;
        eprintln!("[debug] Parsed pipeline:\n{}", json);
    }

    let options = PipelineOptions { auto_clamp };
    let written = run_stages(&parsed, &options)?;

    for path in &written {
        println!("Saved: {}", path.display());
    }

    Ok(())
}
