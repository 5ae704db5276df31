//! Frame enumeration and decoding.
//!
//! Preview images are expected to carry a fixed-width, zero-padded epoch
//! number (`image_0007.png`), so that sorting file names lexicographically
//! yields epoch order. Nothing here parses the number; ordering is purely
//! by name.

use crate::result::{LabError, LabResult};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default pattern for per-epoch preview images
pub const DEFAULT_PATTERN: &str = "image*.png";

/// A directory plus a glob pattern naming the frame files inside it
#[derive(Debug, Clone)]
pub struct FrameSource {
    dir: PathBuf,
    pattern: String,
}

impl FrameSource {
    /// Create a source over `dir` matching `pattern` (for example `image*.png`)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }

    /// Directory being listed
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// List matching files in ascending lexicographic order.
    ///
    /// A missing directory or zero matches yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is malformed or a directory entry
    /// cannot be read while walking.
    pub fn paths(&self) -> LabResult<Vec<PathBuf>> {
        let escaped_dir = glob::Pattern::escape(&self.dir.to_string_lossy());
        let full = Path::new(&escaped_dir).join(&self.pattern);
        let full = full.to_string_lossy();

        let entries = glob::glob(&full).map_err(|e| LabError::InvalidPattern {
            pattern: self.pattern.clone(),
            message: e.to_string(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(glob::GlobError::into_error)?;
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        debug!(
            dir = %self.dir.display(),
            pattern = %self.pattern,
            count = paths.len(),
            "listed frame files"
        );
        Ok(paths)
    }
}

/// A decoded still image with its logical position in the sequence
#[derive(Debug, Clone)]
pub struct Frame {
    path: PathBuf,
    index: i64,
    image: RgbaImage,
}

impl Frame {
    /// Wrap an already decoded image
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, index: i64, image: RgbaImage) -> Self {
        Self {
            path: path.into(),
            index,
            image,
        }
    }

    /// Read and decode `path` as RGBA.
    ///
    /// # Errors
    ///
    /// Returns [`LabError::Decode`] if the file is unreadable or not an image.
    pub fn load(path: &Path, index: i64) -> LabResult<Self> {
        let image = image::open(path)
            .map_err(|e| LabError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .to_rgba8();

        debug!(
            path = %path.display(),
            index,
            width = image.width(),
            height = image.height(),
            "decoded frame"
        );
        Ok(Self::new(path, index, image))
    }

    /// Source file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Logical frame index
    #[must_use]
    pub const fn index(&self) -> i64 {
        self.index
    }

    /// Width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Decoded pixels
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }
}
