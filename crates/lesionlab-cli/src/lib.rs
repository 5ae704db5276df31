//! lesionlab CLI library
//!
//! Argument parsing, configuration, logging setup and command handlers for
//! the `lesionlab` binary.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{Cli, ColorArg, Commands, OutputsArgs, PreviewArgs, SummaryFormat, TrainArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{format_size, ProgressReporter};
