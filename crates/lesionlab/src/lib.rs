//! lesionlab: tooling around GAN / pix2pix lesion-segmentation experiments
//!
//! The training itself happens in external Python scripts. This crate covers
//! what surrounds a run:
//!
//! ```text
//! ┌──────────────────┐   ┌───────────────┐   ┌──────────────────┐
//! │ ExperimentConfig │──►│ ScriptRunner  │──►│ output_file_dir  │
//! │ (yaml / json)    │   │ (subprocess)  │   │ checkpoints, png │
//! └──────────────────┘   └───────────────┘   └────────┬─────────┘
//!                                                     │
//!                           ┌─────────────────────────┴───┐
//!                           ▼                             ▼
//!                  ┌─────────────────┐         ┌──────────────────┐
//!                  │ OutputInventory │         │ build_preview    │
//!                  │ latest epoch    │         │ epoch PNGs → GIF │
//!                  └─────────────────┘         └──────────────────┘
//! ```

#![warn(missing_docs)]

pub mod experiment;
pub mod media;
pub mod outputs;
mod result;
pub mod runner;

pub use experiment::{ExperimentConfig, GeneratorType, TrainOrTest, TrainingScript};
pub use media::{
    build_preview, AnimationConfig, AnimationWriter, Frame, FrameSelector, FrameSource,
    PreviewConfig, PreviewReport,
};
pub use outputs::{classify, latest_preview_epoch, OutputInventory, OutputKind};
pub use result::{LabError, LabResult};
pub use runner::{RunOutcome, ScriptRunner};
