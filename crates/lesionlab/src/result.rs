//! Result and error types for lesionlab.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for lesionlab operations
pub type LabResult<T> = Result<T, LabError>;

/// Errors that can occur in lesionlab
#[derive(Debug, Error)]
pub enum LabError {
    /// Glob pattern could not be parsed
    #[error("Invalid frame pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Pattern as given
        pattern: String,
        /// Error message
        message: String,
    },

    /// A frame file could not be read or decoded
    #[error("Failed to decode frame {}: {message}", .path.display())]
    Decode {
        /// Offending file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// The frame listing was empty, so there is no last frame to repeat
    #[error("No frame files matched '{pattern}' in {}", .dir.display())]
    NoFrames {
        /// Directory that was listed
        dir: PathBuf,
        /// Pattern that was applied
        pattern: String,
    },

    /// Image processing error (resizing, encoding, etc.)
    #[error("Image processing failed: {message}")]
    ImageProcessing {
        /// Error message
        message: String,
    },

    /// Invalid state error (operation called in wrong state)
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Experiment configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Training script could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        /// Program that was launched
        program: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Training script exited unsuccessfully
    #[error("{script} exited with {}", exit_description(*.code))]
    ScriptFailed {
        /// Script file name
        script: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

fn exit_description(code: Option<i32>) -> String {
    code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}"))
}

impl LabError {
    /// Create an image processing error
    #[must_use]
    pub fn image_processing(message: impl Into<String>) -> Self {
        Self::ImageProcessing {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_names_path() {
        let err = LabError::Decode {
            path: PathBuf::from("out/image_0003.png"),
            message: "truncated".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("image_0003.png"));
        assert!(msg.contains("truncated"));
    }

    #[test]
    fn test_no_frames_error() {
        let err = LabError::NoFrames {
            dir: PathBuf::from("previews"),
            pattern: "image*.png".to_string(),
        };
        assert!(err.to_string().contains("image*.png"));
        assert!(err.to_string().contains("previews"));
    }

    #[test]
    fn test_script_failed_with_code() {
        let err = LabError::ScriptFailed {
            script: "pix2pix2d.py".to_string(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "pix2pix2d.py exited with status 2");
    }

    #[test]
    fn test_script_failed_by_signal() {
        let err = LabError::ScriptFailed {
            script: "gan2d.py".to_string(),
            code: None,
        };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: LabError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }

    #[test]
    fn test_helpers() {
        assert!(LabError::image_processing("x")
            .to_string()
            .contains("Image processing"));
        assert!(LabError::invalid_state("x").to_string().contains("Invalid state"));
        assert!(LabError::config("x").to_string().contains("Configuration"));
    }
}
