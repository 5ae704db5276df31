//! Subprocess boundary for the external training scripts.
//!
//! The child's stdout is streamed line by line on the calling thread;
//! stderr is drained on a helper thread so a chatty child cannot block on
//! a full pipe. Only one child runs at a time.

use crate::experiment::ExperimentConfig;
use crate::result::{LabError, LabResult};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use tracing::{info, warn};

/// Default number of stderr lines kept for the outcome
pub const DEFAULT_STDERR_TAIL: usize = 20;

/// Result of a completed script run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Script that ran
    pub script: String,
    /// Exit code (`None` if killed by a signal)
    pub exit_code: Option<i32>,
    /// Lines read from stdout
    pub stdout_lines: usize,
    /// Lines read from stderr
    pub stderr_lines: usize,
    /// Last stderr lines, oldest first
    pub stderr_tail: Vec<String>,
}

/// Launches training scripts described by [`ExperimentConfig`]
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    working_dir: Option<PathBuf>,
    stderr_tail: usize,
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self {
            working_dir: None,
            stderr_tail: DEFAULT_STDERR_TAIL,
        }
    }
}

impl ScriptRunner {
    /// Runner using the current directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run scripts from `dir`
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Keep the last `lines` stderr lines in the outcome
    #[must_use]
    pub const fn with_stderr_tail(mut self, lines: usize) -> Self {
        self.stderr_tail = lines;
        self
    }

    /// Build the command without starting it
    #[must_use]
    pub fn command(&self, config: &ExperimentConfig) -> Command {
        let mut command = Command::new(&config.python);
        command.args(config.to_args());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }

    /// Run the script to completion, passing each stdout line to `on_line`.
    ///
    /// # Errors
    ///
    /// Returns [`LabError::Spawn`] if the interpreter cannot be started,
    /// an I/O error if reading its output fails, and
    /// [`LabError::ScriptFailed`] if it exits unsuccessfully.
    pub fn run<F>(&self, config: &ExperimentConfig, mut on_line: F) -> LabResult<RunOutcome>
    where
        F: FnMut(&str),
    {
        let script = config.script.file_name().to_string();
        info!(command = %config.command_line(), "starting training script");

        let mut child = self
            .command(config)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| LabError::Spawn {
                program: config.python.clone(),
                source,
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| LabError::invalid_state("child stderr was not captured"))?;
        let tail_len = self.stderr_tail;
        let stderr_task = thread::spawn(move || drain_stderr(stderr, tail_len));

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LabError::invalid_state("child stdout was not captured"))?;
        let stdout_lines = for_each_line(stdout, |line| {
            info!(target: "lesionlab::script", "{line}");
            on_line(line);
        });

        let status = reap(&mut child, &stdout_lines)?;
        let stderr_result = stderr_task
            .join()
            .map_err(|_| LabError::invalid_state("stderr reader panicked"))?;
        let stdout_lines = stdout_lines?;
        let (stderr_lines, stderr_tail) = stderr_result?;

        if !status.success() {
            return Err(LabError::ScriptFailed {
                script,
                code: status.code(),
            });
        }

        info!(script = %script, stdout_lines, stderr_lines, "training script finished");
        Ok(RunOutcome {
            script,
            exit_code: status.code(),
            stdout_lines,
            stderr_lines,
            stderr_tail: stderr_tail.into(),
        })
    }
}

/// Wait for the child, killing it first if its stdout could not be read
fn reap(child: &mut Child, stdout: &std::io::Result<usize>) -> std::io::Result<ExitStatus> {
    if let Err(e) = stdout {
        warn!(error = %e, "stopped reading script output, terminating it");
        if let Err(e) = child.kill() {
            warn!(error = %e, "could not terminate training script");
        }
    }
    child.wait()
}

fn drain_stderr<R: Read>(stderr: R, keep: usize) -> std::io::Result<(usize, VecDeque<String>)> {
    let mut tail = VecDeque::with_capacity(keep);
    let count = for_each_line(stderr, |line| {
        warn!(target: "lesionlab::script", "{line}");
        if keep > 0 {
            if tail.len() == keep {
                tail.pop_front();
            }
            tail.push_back(line.to_string());
        }
    })?;
    Ok((count, tail))
}

/// Split on `\n`, tolerating `\r\n` and invalid UTF-8
fn for_each_line<R: Read>(reader: R, mut f: impl FnMut(&str)) -> std::io::Result<usize> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut count = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(count);
        }
        let text = String::from_utf8_lossy(&buf);
        f(text.trim_end_matches(['\n', '\r']));
        count += 1;
    }
}
