//! Streaming GIF writer for training previews.
//!
//! The output file is opened when the writer is created, frames are
//! quantized and written as they arrive, and [`AnimationWriter::finish`]
//! writes the trailer. A writer that is dropped without a successful
//! `finish` closes its handle and deletes the incomplete file.

use crate::media::frame_source::Frame;
use crate::result::{LabError, LabResult};
use gif::{Encoder, Repeat};
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Encoding settings for a preview animation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Frames per second (1-60)
    pub fps: u8,
    /// Quality level (1-100, affects palette quantization)
    pub quality: u8,
    /// Loop count (0 = infinite)
    pub loop_count: u16,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            quality: 80,
            loop_count: 0,
        }
    }
}

impl AnimationConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set frames per second
    #[must_use]
    pub fn with_fps(mut self, fps: u8) -> Self {
        self.fps = fps.clamp(1, 60);
        self
    }

    /// Set quality (1-100)
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Set loop count (0 = infinite)
    #[must_use]
    pub const fn with_loop_count(mut self, count: u16) -> Self {
        self.loop_count = count;
        self
    }

    /// Frame delay in centiseconds (GIF standard)
    #[must_use]
    pub fn frame_delay_cs(&self) -> u16 {
        (100 / u16::from(self.fps.max(1))).max(1)
    }

    /// Map quality (1-100) to NeuQuant speed (1-30); higher quality is slower
    #[must_use]
    pub fn quantizer_speed(&self) -> i32 {
        let normalized = i32::from(100 - self.quality.min(100));
        (normalized * 29 / 100 + 1).clamp(1, 30)
    }

    const fn repeat(&self) -> Repeat {
        if self.loop_count == 0 {
            Repeat::Infinite
        } else {
            Repeat::Finite(self.loop_count)
        }
    }
}

enum Sink {
    /// File is open, canvas size not yet known
    Opened(BufWriter<File>),
    /// Header written, canvas fixed by the first frame
    Encoding {
        encoder: Encoder<BufWriter<File>>,
        width: u32,
        height: u32,
    },
    /// Handle released
    Closed,
}

/// Single-use GIF writer bound to one output path
pub struct AnimationWriter {
    path: PathBuf,
    config: AnimationConfig,
    sink: Sink,
    frames_written: usize,
    last_index: Option<i64>,
    finished: bool,
}

impl std::fmt::Debug for AnimationWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationWriter")
            .field("path", &self.path)
            .field("config", &self.config)
            .field("frames_written", &self.frames_written)
            .field("last_index", &self.last_index)
            .field("open", &self.is_open())
            .finish()
    }
}

impl AnimationWriter {
    /// Open `path` for writing.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn create(path: impl Into<PathBuf>, config: AnimationConfig) -> LabResult<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        debug!(path = %path.display(), "opened animation output");

        Ok(Self {
            path,
            config,
            sink: Sink::Opened(BufWriter::new(file)),
            frames_written: 0,
            last_index: None,
            finished: false,
        })
    }

    /// Output path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of frames appended so far
    #[must_use]
    pub const fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Whether the output handle is still open
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self.sink, Sink::Closed)
    }

    /// Append one frame.
    ///
    /// The first frame fixes the canvas size; later frames of another size
    /// are resized to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer is closed, the frame's logical index
    /// goes backwards, the frame is too large for GIF, or encoding fails.
    pub fn append(&mut self, frame: &Frame) -> LabResult<()> {
        if let Some(last) = self.last_index {
            if frame.index() < last {
                return Err(LabError::invalid_state(format!(
                    "frame index {} appended after {last}",
                    frame.index()
                )));
            }
        }

        let sink = std::mem::replace(&mut self.sink, Sink::Closed);
        let (mut encoder, width, height) = match sink {
            Sink::Opened(out) => self.start_encoder(out, frame.width(), frame.height())?,
            Sink::Encoding {
                encoder,
                width,
                height,
            } => (encoder, width, height),
            Sink::Closed => {
                return Err(LabError::invalid_state("animation writer is closed"));
            }
        };

        let mut rgba = if frame.width() == width && frame.height() == height {
            frame.image().as_raw().clone()
        } else {
            debug!(
                path = %frame.path().display(),
                from = ?(frame.width(), frame.height()),
                to = ?(width, height),
                "resizing frame to canvas"
            );
            imageops::resize(frame.image(), width, height, FilterType::Triangle).into_raw()
        };

        let mut gif_frame = gif::Frame::from_rgba_speed(
            width as u16,
            height as u16,
            &mut rgba,
            self.config.quantizer_speed(),
        );
        gif_frame.delay = self.config.frame_delay_cs();

        let written = encoder.write_frame(&gif_frame);
        self.sink = Sink::Encoding {
            encoder,
            width,
            height,
        };
        written.map_err(|e| LabError::image_processing(format!("Failed to write GIF frame: {e}")))?;

        self.frames_written += 1;
        self.last_index = Some(frame.index());
        debug!(
            path = %frame.path().display(),
            index = frame.index(),
            written = self.frames_written,
            "appended frame"
        );
        Ok(())
    }

    /// Write the trailer and close the file.
    ///
    /// # Errors
    ///
    /// Returns an error if no frame was appended, the writer is already
    /// closed, or flushing fails. The incomplete file is removed on error.
    pub fn finish(mut self) -> LabResult<PathBuf> {
        match std::mem::replace(&mut self.sink, Sink::Closed) {
            Sink::Encoding { encoder, .. } => {
                let mut out = encoder
                    .into_inner()
                    .map_err(|e| LabError::image_processing(format!("Failed to finish GIF: {e}")))?;
                out.flush()?;
                drop(out);
                self.finished = true;
                debug!(path = %self.path.display(), frames = self.frames_written, "closed animation output");
                Ok(self.path.clone())
            }
            Sink::Opened(_) => Err(LabError::invalid_state("no frames appended")),
            Sink::Closed => Err(LabError::invalid_state("animation writer is closed")),
        }
    }

    fn start_encoder(
        &self,
        out: BufWriter<File>,
        width: u32,
        height: u32,
    ) -> LabResult<(Encoder<BufWriter<File>>, u32, u32)> {
        if width == 0 || height == 0 || width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(LabError::image_processing(format!(
                "frame size {width}x{height} is outside the GIF limits"
            )));
        }

        let mut encoder = Encoder::new(out, width as u16, height as u16, &[])
            .map_err(|e| LabError::image_processing(format!("Failed to create GIF encoder: {e}")))?;
        encoder
            .set_repeat(self.config.repeat())
            .map_err(|e| LabError::image_processing(format!("Failed to set GIF repeat: {e}")))?;

        Ok((encoder, width, height))
    }
}

impl Drop for AnimationWriter {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // Release the handle before unlinking.
        self.sink = Sink::Closed;
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "could not remove unfinished animation");
        } else {
            debug!(path = %self.path.display(), "removed unfinished animation");
        }
    }
}
