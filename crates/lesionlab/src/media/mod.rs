//! Training preview media.
//!
//! Turns a directory of per-epoch preview images into a looping GIF:
//!
//! - **frame_source**: sorted listing and decoding of frame files
//! - **selector**: logical-index frame selection
//! - **gif_writer**: streaming GIF output with cleanup on failure
//! - **preview**: the end-to-end build

mod frame_source;
mod gif_writer;
mod preview;
mod selector;

pub use frame_source::{Frame, FrameSource, DEFAULT_PATTERN};
pub use gif_writer::{AnimationConfig, AnimationWriter};
pub use preview::{build_preview, default_viewer_copy, PreviewConfig, PreviewReport, DEFAULT_OUTPUT};
pub use selector::{FrameSelector, SelectedFrame};
