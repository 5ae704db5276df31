//! Inventory of a training run's output directory.

use crate::media::FrameSource;
use crate::result::LabResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Broad category of an output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Preview image or animation
    Preview,
    /// Model checkpoint file
    Checkpoint,
    /// Anything else (logs, csv, ...)
    Other,
}

/// Classify a file by name
#[must_use]
pub fn classify(name: &str) -> OutputKind {
    let lower = name.to_ascii_lowercase();
    let ext = Path::new(&lower)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    if lower == "checkpoint"
        || lower.contains(".ckpt")
        || lower.contains(".data-")
        || matches!(ext, "index" | "meta" | "h5" | "pt" | "pth")
    {
        OutputKind::Checkpoint
    } else if matches!(ext, "png" | "gif" | "jpg" | "jpeg") {
        OutputKind::Preview
    } else {
        OutputKind::Other
    }
}

/// One file in the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    /// File name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Category
    pub kind: OutputKind,
}

/// Files left in a run's `output_file_dir`, sorted by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputInventory {
    /// Scanned directory
    pub dir: PathBuf,
    /// Regular files, sorted by name
    pub entries: Vec<OutputEntry>,
}

impl OutputInventory {
    /// List the regular files directly inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be read.
    pub fn scan(dir: impl Into<PathBuf>) -> LabResult<Self> {
        let dir = dir.into();
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push(OutputEntry {
                kind: classify(&name),
                size: meta.len(),
                name,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { dir, entries })
    }

    /// Entries of one kind
    pub fn of_kind(&self, kind: OutputKind) -> impl Iterator<Item = &OutputEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Number of entries of one kind
    #[must_use]
    pub fn count(&self, kind: OutputKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Sum of all file sizes
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }
}

/// Epoch number of the newest preview frame: the trailing digits of the
/// last file in the sorted listing. `None` if nothing matches or the last
/// name carries no number.
///
/// # Errors
///
/// Returns an error if the pattern is malformed.
pub fn latest_preview_epoch(dir: &Path, pattern: &str) -> LabResult<Option<u32>> {
    let paths = FrameSource::new(dir, pattern).paths()?;
    Ok(paths
        .last()
        .and_then(|p| p.file_stem())
        .and_then(|s| trailing_number(&s.to_string_lossy())))
}

fn trailing_number(stem: &str) -> Option<u32> {
    let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    stem[stem.len() - digits..].parse().ok()
}
