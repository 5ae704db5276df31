//! lesionlab: experiment runner and training preview tool
//!
//! ## Usage
//!
//! ```bash
//! lesionlab train --config pix2pix.yaml --resume    # Continue a run
//! lesionlab outputs runs/pix2pix                    # What did it write?
//! lesionlab preview runs/pix2pix -o training.gif    # Epoch PNGs -> GIF
//! ```

use clap::Parser;
use lesionlab_cli::{handlers, logging, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);

    console::set_colors_enabled(config.color.should_color());
    console::set_colors_enabled_stderr(config.color.should_color());
    logging::init(&config);

    match cli.command {
        Commands::Preview(args) => handlers::execute_preview(&config, &args).map(|_| ()),
        Commands::Train(args) => handlers::execute_train(&config, &args),
        Commands::Outputs(args) => handlers::execute_outputs(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.clone().into();

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}
