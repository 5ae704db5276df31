//! Training-script invocation contract.
//!
//! An [`ExperimentConfig`] names one of the external training scripts and
//! the flags to pass it. The flags are forwarded as `--name=value`; their
//! meaning belongs to the script and is not checked here. Options left
//! unset are omitted so the script's own defaults apply.

use crate::result::{LabError, LabResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// External training scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingScript {
    /// Unconditional 2D GAN
    Gan2d,
    /// Conditional image-to-image GAN on 2D slices
    Pix2pix2d,
    /// Conditional image-to-image GAN on 3D volumes
    Pix2pix3d,
}

impl TrainingScript {
    /// Script file name
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Gan2d => "gan2d.py",
            Self::Pix2pix2d => "pix2pix2d.py",
            Self::Pix2pix3d => "pix2pix3d.py",
        }
    }
}

impl fmt::Display for TrainingScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Whether the script trains or only runs inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainOrTest {
    /// Train (default)
    Train,
    /// Inference only
    Test,
}

impl fmt::Display for TrainOrTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Train => f.write_str("train"),
            Self::Test => f.write_str("test"),
        }
    }
}

/// Generator network family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorType {
    /// U-Net with skip connections
    Unet,
    /// Residual network
    Resnet,
}

impl fmt::Display for GeneratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unet => f.write_str("unet"),
            Self::Resnet => f.write_str("resnet"),
        }
    }
}

fn default_python() -> String {
    "python3".to_string()
}

/// One training-script invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Script to run
    pub script: TrainingScript,
    /// Interpreter used to launch the script
    #[serde(default = "default_python")]
    pub python: String,
    /// Directory containing the scripts; the working directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_dir: Option<PathBuf>,
    /// Input images (unpaired scripts)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Source-domain images (paired scripts)
    #[serde(default, rename = "data_dir_A", skip_serializing_if = "Option::is_none")]
    pub data_dir_a: Option<PathBuf>,
    /// Target-domain images (paired scripts)
    #[serde(default, rename = "data_dir_B", skip_serializing_if = "Option::is_none")]
    pub data_dir_b: Option<PathBuf>,
    /// Where checkpoints and preview images are written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file_dir: Option<PathBuf>,
    /// Load prior model state instead of starting from scratch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_checkpoints: Option<bool>,
    /// Epoch counter to resume from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_epoch: Option<u32>,
    /// Training or inference-only mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_or_test: Option<TrainOrTest>,
    /// Subsample the dataset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_partial_data: Option<bool>,
    /// Randomly swap channels 1 and 3 of the target image
    #[serde(
        default,
        rename = "swap_noise_imB_channel_13",
        skip_serializing_if = "Option::is_none"
    )]
    pub swap_noise_imb_channel_13: Option<bool>,
    /// Stratified sampling of lesion / non-lesion regions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_balanced: Option<bool>,
    /// Only save preview slides that contain a lesion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_slides_with_lesion_only: Option<bool>,
    /// Generator architecture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_type: Option<GeneratorType>,
    /// Appended verbatim after the known flags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,
}

impl ExperimentConfig {
    /// Invocation of `script` with no flags set
    #[must_use]
    pub fn new(script: TrainingScript) -> Self {
        Self {
            script,
            python: default_python(),
            script_dir: None,
            data_dir: None,
            data_dir_a: None,
            data_dir_b: None,
            output_file_dir: None,
            restore_checkpoints: None,
            start_epoch: None,
            train_or_test: None,
            use_partial_data: None,
            swap_noise_imb_channel_13: None,
            sample_balanced: None,
            save_slides_with_lesion_only: None,
            generator_type: None,
            extra_args: Vec::new(),
        }
    }

    /// Load from a YAML (`.yaml`/`.yml`) or JSON (`.json`) file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown
    /// extension, or does not parse.
    pub fn from_path(path: &Path) -> LabResult<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&text),
            Some("json") => Ok(serde_json::from_str(&text)?),
            _ => Err(LabError::config(format!(
                "unsupported experiment file {} (expected .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Parse YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid experiment description.
    pub fn from_yaml(text: &str) -> LabResult<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Set the script directory
    #[must_use]
    pub fn with_script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_dir = Some(dir.into());
        self
    }

    /// Set the output directory
    #[must_use]
    pub fn with_output_file_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_file_dir = Some(dir.into());
        self
    }

    /// Restore checkpoints and continue after `last_epoch`
    #[must_use]
    pub const fn resume_from(mut self, last_epoch: u32) -> Self {
        self.restore_checkpoints = Some(true);
        self.start_epoch = Some(last_epoch.saturating_add(1));
        self
    }

    /// Path of the script file
    #[must_use]
    pub fn script_path(&self) -> PathBuf {
        let name = self.script.file_name();
        self.script_dir
            .as_ref()
            .map_or_else(|| PathBuf::from(name), |dir| dir.join(name))
    }

    /// Flags in `--name=value` form, known flags first, then `extra_args`
    #[must_use]
    pub fn flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        let mut push = |name: &str, value: Option<String>| {
            if let Some(value) = value {
                flags.push(format!("--{name}={value}"));
            }
        };

        let path = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());
        push("data_dir", path(&self.data_dir));
        push("data_dir_A", path(&self.data_dir_a));
        push("data_dir_B", path(&self.data_dir_b));
        push("output_file_dir", path(&self.output_file_dir));
        push("restore_checkpoints", self.restore_checkpoints.map(py_bool));
        push("start_epoch", self.start_epoch.map(|e| e.to_string()));
        push("train_or_test", self.train_or_test.map(|m| m.to_string()));
        push("use_partial_data", self.use_partial_data.map(py_bool));
        push(
            "swap_noise_imB_channel_13",
            self.swap_noise_imb_channel_13.map(py_bool),
        );
        push("sample_balanced", self.sample_balanced.map(py_bool));
        push(
            "save_slides_with_lesion_only",
            self.save_slides_with_lesion_only.map(py_bool),
        );
        push("generator_type", self.generator_type.map(|g| g.to_string()));

        flags.extend(self.extra_args.iter().cloned());
        flags
    }

    /// Interpreter arguments: script path followed by [`Self::flags`]
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![self.script_path().display().to_string()];
        args.extend(self.flags());
        args
    }

    /// Shell-like rendering for display
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.python.clone())
            .chain(self.to_args())
            .map(|arg| shell_quote(&arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn py_bool(value: bool) -> String {
    let literal = if value { "True" } else { "False" };
    literal.to_string()
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=./:,+@".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PIX2PIX_YAML: &str = r"
script: pix2pix2d
script_dir: /opt/scripts
data_dir_A: data/t1
data_dir_B: data/lesion
output_file_dir: runs/pix2pix
restore_checkpoints: true
start_epoch: 20
train_or_test: train
swap_noise_imB_channel_13: true
sample_balanced: false
generator_type: resnet
extra_args: ['--batch_size=4']
";

    #[test]
    fn test_script_file_names() {
        assert_eq!(TrainingScript::Gan2d.file_name(), "gan2d.py");
        assert_eq!(TrainingScript::Pix2pix2d.file_name(), "pix2pix2d.py");
        assert_eq!(TrainingScript::Pix2pix3d.file_name(), "pix2pix3d.py");
    }

    #[test]
    fn test_no_flags_by_default() {
        let config = ExperimentConfig::new(TrainingScript::Gan2d);
        assert!(config.flags().is_empty());
        assert_eq!(config.to_args(), vec!["gan2d.py".to_string()]);
        assert_eq!(config.python, "python3");
    }

    #[test]
    fn test_parse_yaml_and_render_flags() {
        let config = ExperimentConfig::from_yaml(PIX2PIX_YAML).unwrap();

        assert_eq!(config.script, TrainingScript::Pix2pix2d);
        assert_eq!(config.script_path(), PathBuf::from("/opt/scripts/pix2pix2d.py"));
        assert_eq!(
            config.flags(),
            vec![
                "--data_dir_A=data/t1",
                "--data_dir_B=data/lesion",
                "--output_file_dir=runs/pix2pix",
                "--restore_checkpoints=True",
                "--start_epoch=20",
                "--train_or_test=train",
                "--swap_noise_imB_channel_13=True",
                "--sample_balanced=False",
                "--generator_type=resnet",
                "--batch_size=4",
            ]
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ExperimentConfig::from_yaml("script: gan2d\nlearning_rate: 0.1\n");
        assert!(matches!(result, Err(LabError::Yaml(_))));
    }

    #[test]
    fn test_unknown_script_rejected() {
        assert!(ExperimentConfig::from_yaml("script: cyclegan\n").is_err());
    }

    #[test]
    fn test_yaml_round_trip_keeps_flag_names() {
        let config = ExperimentConfig::from_yaml(PIX2PIX_YAML).unwrap();
        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        assert!(yaml.contains("data_dir_A"));
        assert!(yaml.contains("swap_noise_imB_channel_13"));
        assert!(!yaml.contains("data_dir:"));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gan.json");
        std::fs::write(
            &path,
            r#"{"script": "gan2d", "data_dir": "data/mri", "use_partial_data": true}"#,
        )
        .unwrap();

        let config = ExperimentConfig::from_path(&path).unwrap();
        assert_eq!(
            config.flags(),
            vec!["--data_dir=data/mri", "--use_partial_data=True"]
        );
    }

    #[test]
    fn test_from_path_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gan.toml");
        std::fs::write(&path, "script = 'gan2d'").unwrap();

        let result = ExperimentConfig::from_path(&path);
        assert!(matches!(result, Err(LabError::Config { .. })));
    }

    #[test]
    fn test_resume_from() {
        let config = ExperimentConfig::new(TrainingScript::Pix2pix3d).resume_from(41);
        assert_eq!(config.restore_checkpoints, Some(true));
        assert_eq!(config.start_epoch, Some(42));
    }

    #[test]
    fn test_command_line_quotes_spaces() {
        let config = ExperimentConfig::new(TrainingScript::Gan2d)
            .with_output_file_dir("my runs/gan");
        assert_eq!(
            config.command_line(),
            "python3 gan2d.py '--output_file_dir=my runs/gan'"
        );
    }

    #[test]
    fn test_test_mode_and_generator_display() {
        let mut config = ExperimentConfig::new(TrainingScript::Pix2pix2d);
        config.train_or_test = Some(TrainOrTest::Test);
        config.generator_type = Some(GeneratorType::Unet);
        assert_eq!(
            config.flags(),
            vec!["--train_or_test=test", "--generator_type=unet"]
        );
    }
}
