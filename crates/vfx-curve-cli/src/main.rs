//! vfx-curve - fit, sample and export color grading curves
//!
//! Reads a YAML curve set, fits every curve into one packed table and
//! prints samples, packed arrays or GPU evaluation code.

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "vfx-curve")]
#[command(author, version, about = "Fit, sample and export color grading curves")]
#[command(long_about = "
Fits shape-preserving quadratic splines through the control points of a
YAML curve set and evaluates or exports them.

Examples:
  vfx-curve fit grade.yaml                       # Knot/coef counts per curve
  vfx-curve fit grade.yaml --arrays              # Packed arrays for upload
  vfx-curve sample grade.yaml -c master -n 5     # x,y CSV rows
  vfx-curve eval grade.yaml -c master 0.25 0.5   # Single values
  vfx-curve eval grade.yaml -c master 0.3 --inverse
  vfx-curve shader grade.yaml --mode continuous --lang hlsl -o hue.hlsl
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit all curves and report the packed table
    Fit(FitArgs),

    /// Sample a curve over a range as CSV
    #[command(visible_alias = "s")]
    Sample(SampleArgs),

    /// Evaluate a curve at given values
    #[command(visible_alias = "e")]
    Eval(EvalArgs),

    /// Emit GPU evaluation code
    Shader(ShaderArgs),
}

#[derive(Args)]
struct FitArgs {
    /// Curve set (YAML)
    config: PathBuf,

    /// Also print the packed knot/coefficient arrays
    #[arg(short, long)]
    arrays: bool,
}

#[derive(Args)]
struct SampleArgs {
    /// Curve set (YAML)
    config: PathBuf,

    /// Curve name
    #[arg(short, long)]
    curve: String,

    /// Number of samples
    #[arg(short = 'n', long, default_value = "11")]
    count: usize,

    /// First sample
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    from: f32,

    /// Last sample
    #[arg(long, default_value = "1.0", allow_negative_numbers = true)]
    to: f32,

    /// Sample the inverse curve
    #[arg(short, long)]
    inverse: bool,
}

#[derive(Args)]
struct EvalArgs {
    /// Curve set (YAML)
    config: PathBuf,

    /// Curve name
    #[arg(short, long)]
    curve: String,

    /// Values to evaluate
    #[arg(required = true, allow_negative_numbers = true)]
    values: Vec<f32>,

    /// Evaluate the inverse curve
    #[arg(short, long)]
    inverse: bool,
}

/// Shader function kind.
#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Forward,
    Inverse,
    Continuous,
}

/// Shader language.
#[derive(Clone, Copy, ValueEnum)]
enum LangArg {
    Glsl,
    GlslEs,
    Hlsl,
}

#[derive(Args)]
struct ShaderArgs {
    /// Curve set (YAML)
    config: PathBuf,

    /// Function kind
    #[arg(short, long, value_enum, default_value = "forward")]
    mode: ModeArg,

    /// Target language
    #[arg(short, long, value_enum, default_value = "glsl")]
    lang: LangArg,

    /// Function name (defaults per mode)
    #[arg(long)]
    name: Option<String>,

    /// Prefix for the buffer names
    #[arg(long, default_value = "")]
    prefix: String,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Fit(args) => commands::fit::run(args, cli.verbose),
        Commands::Sample(args) => commands::sample::run(args, cli.verbose),
        Commands::Eval(args) => commands::eval::run(args, cli.verbose),
        Commands::Shader(args) => commands::shader::run(args, cli.verbose),
    }
}
