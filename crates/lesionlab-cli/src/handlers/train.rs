//! Train command handler.
//!
//! Loads an experiment file, applies command-line overrides, optionally
//! resumes from the newest preview epoch, then runs the script.

use crate::commands::TrainArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use lesionlab::{latest_preview_epoch, ExperimentConfig, ScriptRunner};
use tracing::info;

/// Experiment to run, plus what `--resume` found
#[derive(Debug)]
pub struct TrainPlan {
    /// Fully resolved invocation
    pub experiment: ExperimentConfig,
    /// Newest preview epoch, when `--resume` found one
    pub resumed_after: Option<u32>,
}

/// Build the experiment to run from the file and the overrides
pub fn prepare_experiment(args: &TrainArgs) -> CliResult<TrainPlan> {
    let mut experiment = ExperimentConfig::from_path(&args.config)?;

    if let Some(dir) = &args.script_dir {
        experiment.script_dir = Some(dir.clone());
    }
    if let Some(python) = &args.python {
        experiment.python.clone_from(python);
    }

    let mut resumed_after = None;
    if args.resume {
        let dir = experiment.output_file_dir.clone().ok_or_else(|| {
            CliError::invalid_argument("--resume needs output_file_dir in the experiment file")
        })?;
        if let Some(epoch) = latest_preview_epoch(&dir, &args.pattern)? {
            info!(epoch, dir = %dir.display(), "resuming after newest preview epoch");
            experiment = experiment.resume_from(epoch);
            resumed_after = Some(epoch);
        }
    }

    Ok(TrainPlan {
        experiment,
        resumed_after,
    })
}

/// Execute the train command.
pub fn execute_train(config: &CliConfig, args: &TrainArgs) -> CliResult<()> {
    let TrainPlan {
        experiment,
        resumed_after,
    } = prepare_experiment(args)?;

    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    if args.resume && resumed_after.is_none() {
        reporter.warning("No preview frames found, starting from scratch");
    }

    if args.dry_run {
        println!("{}", experiment.command_line());
        return Ok(());
    }

    reporter.start_spinner(&format!("Running {}", experiment.script));
    let result = ScriptRunner::new().run(&experiment, |line| reporter.set_message(line));
    reporter.finish();

    let outcome = result?;
    reporter.success(&format!(
        "{} finished ({} line(s) of output)",
        outcome.script, outcome.stdout_lines
    ));
    Ok(())
}
