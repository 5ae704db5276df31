//! Command handlers - kept out of main.rs for testability

pub mod outputs;
pub mod preview;
pub mod train;

pub use outputs::{collect_outputs, execute_outputs, render_outputs_text, OutputsSummary};
pub use preview::{execute_preview, preview_config, render_preview_text};
pub use train::{execute_train, prepare_experiment, TrainPlan};
