//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use lesionlab::media::{DEFAULT_OUTPUT, DEFAULT_PATTERN};
use std::path::PathBuf;

/// lesionlab: run GAN / pix2pix lesion experiments and preview their progress
#[derive(Parser, Debug)]
#[command(name = "lesionlab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stitch per-epoch preview images into a looping GIF
    Preview(PreviewArgs),

    /// Run a training script from an experiment file
    Train(TrainArgs),

    /// List what a training run left in its output directory
    Outputs(OutputsArgs),
}

/// Arguments for the preview command
#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Directory holding the per-epoch images
    pub dir: PathBuf,

    /// Glob pattern for frame files (names must be zero-padded)
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Animation output path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Path of the byte-identical copy (default: output path + ".png")
    #[arg(long, conflicts_with = "no_viewer_copy")]
    pub viewer_copy: Option<PathBuf>,

    /// Do not write the viewer copy
    #[arg(long)]
    pub no_viewer_copy: bool,

    /// Frame rate
    #[arg(long, default_value = "10")]
    pub fps: u8,

    /// Quantization quality (1-100)
    #[arg(long, default_value = "80")]
    pub quality: u8,

    /// Loop count (0 = forever)
    #[arg(long, default_value = "0")]
    pub loop_count: u16,

    /// Summary format
    #[arg(short, long, default_value = "text")]
    pub format: SummaryFormat,
}

/// Arguments for the train command
#[derive(Parser, Debug)]
pub struct TrainArgs {
    /// Experiment file (.yaml, .yml or .json)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Directory containing the training scripts (overrides the file)
    #[arg(long)]
    pub script_dir: Option<PathBuf>,

    /// Interpreter (overrides the file)
    #[arg(long)]
    pub python: Option<String>,

    /// Restore checkpoints and continue after the newest preview epoch
    #[arg(long)]
    pub resume: bool,

    /// Preview pattern used to find the newest epoch with --resume
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Print the command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the outputs command
#[derive(Parser, Debug)]
pub struct OutputsArgs {
    /// Output directory of a run
    pub dir: PathBuf,

    /// Preview pattern used to find the newest epoch
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Summary format
    #[arg(short, long, default_value = "text")]
    pub format: SummaryFormat,
}

/// Summary output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SummaryFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
