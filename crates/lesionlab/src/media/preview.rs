//! Assemble per-epoch preview images into one looping GIF.

use crate::media::frame_source::{Frame, FrameSource, DEFAULT_PATTERN};
use crate::media::gif_writer::{AnimationConfig, AnimationWriter};
use crate::media::selector::FrameSelector;
use crate::result::{LabError, LabResult};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default animation file name
pub const DEFAULT_OUTPUT: &str = "training.gif";

/// Where frames come from and where the animation goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Directory holding the per-epoch images
    pub frames_dir: PathBuf,
    /// Glob pattern for frame files inside `frames_dir`
    pub pattern: String,
    /// Animation output path
    pub output: PathBuf,
    /// Byte-identical copy for viewers that dispatch on extension
    pub viewer_copy: Option<PathBuf>,
    /// Encoding settings
    pub animation: AnimationConfig,
}

impl PreviewConfig {
    /// Frames from `frames_dir`, animation written to `output`, viewer copy
    /// at `output` with `.png` appended
    #[must_use]
    pub fn new(frames_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        let output = output.into();
        Self {
            frames_dir: frames_dir.into(),
            pattern: DEFAULT_PATTERN.to_string(),
            viewer_copy: Some(default_viewer_copy(&output)),
            output,
            animation: AnimationConfig::default(),
        }
    }

    /// Set the frame file pattern
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Set or disable the viewer copy
    #[must_use]
    pub fn with_viewer_copy(mut self, path: Option<PathBuf>) -> Self {
        self.viewer_copy = path;
        self
    }

    /// Set encoding options
    #[must_use]
    pub fn with_animation(mut self, animation: AnimationConfig) -> Self {
        self.animation = animation;
        self
    }
}

/// `training.gif` -> `training.gif.png`
#[must_use]
pub fn default_viewer_copy(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".png");
    PathBuf::from(name)
}

/// Outcome of a successful build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewReport {
    /// Files matched by the pattern
    pub source_frames: usize,
    /// Files dropped by the selector
    pub skipped_frames: usize,
    /// Frames in the animation, including the trailing repeat
    pub frames_written: usize,
    /// File repeated at the end
    pub last_frame: PathBuf,
    /// Animation path
    pub output: PathBuf,
    /// Viewer copy path, if one was made
    pub viewer_copy: Option<PathBuf>,
}

/// Build the preview animation described by `config`.
///
/// Every selected frame is decoded and appended in name order, then the
/// last listed file is appended once more, so N inputs give N+1 frames.
/// Files at the output and viewer-copy paths are never listed as frames.
///
/// The animation and its copy are written to hidden `.partial` siblings
/// and renamed into place only once both are complete. A build that fails
/// before that leaves any earlier output and copy untouched and removes
/// its staging files.
///
/// # Errors
///
/// Fails if the viewer copy would overwrite the output, the output cannot
/// be created, any frame fails to decode or encode, no file matches the
/// pattern, or the viewer copy cannot be written.
pub fn build_preview(config: &PreviewConfig) -> LabResult<PreviewReport> {
    if let Some(copy) = &config.viewer_copy {
        if same_path(copy, &config.output) {
            return Err(LabError::config(format!(
                "viewer copy {} would overwrite the animation",
                copy.display()
            )));
        }
    }

    let staged_output = staging_path(&config.output)?;
    let staged_copy = config.viewer_copy.as_deref().map(staging_path).transpose()?;

    let mut reserved = vec![resolved(&config.output), resolved(&staged_output)];
    if let (Some(copy), Some(staged)) = (&config.viewer_copy, &staged_copy) {
        reserved.push(resolved(copy));
        reserved.push(resolved(staged));
    }

    let source = FrameSource::new(&config.frames_dir, &config.pattern);
    let mut paths = source.paths()?;
    paths.retain(|path| {
        let is_output = reserved.contains(&resolved(path));
        if is_output {
            debug!(path = %path.display(), "not treating build output as a frame");
        }
        !is_output
    });
    let source_frames = paths.len();

    let mut writer = AnimationWriter::create(&staged_output, config.animation.clone())?;
    let mut selector = FrameSelector::new(paths);

    for selected in selector.by_ref() {
        let frame = Frame::load(&selected.path, selected.index)?;
        writer.append(&frame)?;
    }

    // The final listed file is shown twice. It is unclear whether this was
    // meant to hold the last epoch on screen or is an off-by-one; it is
    // kept because the frame count is observable.
    let last_path = selector.last_seen().cloned().ok_or_else(|| LabError::NoFrames {
        dir: config.frames_dir.clone(),
        pattern: config.pattern.clone(),
    })?;
    let last = Frame::load(&last_path, selector.last_selected())?;
    writer.append(&last)?;

    let frames_written = writer.frames_written();
    let staged_output = writer.finish()?;

    if let Some(staged) = &staged_copy {
        if let Err(e) = fs::copy(&staged_output, staged) {
            discard(&[&staged_output, staged]);
            return Err(e.into());
        }
    }

    if let Err(e) = fs::rename(&staged_output, &config.output) {
        discard(&[&staged_output]);
        if let Some(staged) = &staged_copy {
            discard(&[staged]);
        }
        return Err(e.into());
    }

    if let (Some(copy), Some(staged)) = (&config.viewer_copy, &staged_copy) {
        if let Err(e) = fs::rename(staged, copy) {
            // The new animation is already in place; leave neither half.
            discard(&[staged, copy, &config.output]);
            return Err(e.into());
        }
    }

    info!(
        frames = frames_written,
        source = source_frames,
        output = %config.output.display(),
        "built preview animation"
    );

    Ok(PreviewReport {
        source_frames,
        skipped_frames: selector.skipped(),
        frames_written,
        last_frame: last_path,
        output: config.output.clone(),
        viewer_copy: config.viewer_copy.clone(),
    })
}

/// `runs/training.gif` -> `runs/.training.gif.partial`
fn staging_path(target: &Path) -> LabResult<PathBuf> {
    let name = target
        .file_name()
        .ok_or_else(|| LabError::config(format!("{} does not name a file", target.display())))?;
    let mut staged = OsString::from(".");
    staged.push(name);
    staged.push(".partial");
    Ok(target.with_file_name(staged))
}

/// Canonical form of `path`, resolving the parent when the file does not
/// exist yet
fn resolved(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    a == b || resolved(a) == resolved(b)
}

fn discard(paths: &[&Path]) {
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "removed incomplete preview file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "could not remove preview file"),
        }
    }
}
