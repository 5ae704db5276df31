//! Preview command handler.
//!
//! Orchestrates: list frames -> select -> encode GIF -> viewer copy -> summary.

use crate::commands::{PreviewArgs, SummaryFormat};
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use lesionlab::media::{default_viewer_copy, AnimationConfig, PreviewConfig, PreviewReport};

/// Translate CLI arguments into a build configuration
#[must_use]
pub fn preview_config(args: &PreviewArgs) -> PreviewConfig {
    let viewer_copy = if args.no_viewer_copy {
        None
    } else {
        Some(
            args.viewer_copy
                .clone()
                .unwrap_or_else(|| default_viewer_copy(&args.output)),
        )
    };

    let animation = AnimationConfig::new()
        .with_fps(args.fps)
        .with_quality(args.quality)
        .with_loop_count(args.loop_count);

    PreviewConfig::new(&args.dir, &args.output)
        .with_pattern(&args.pattern)
        .with_viewer_copy(viewer_copy)
        .with_animation(animation)
}

/// Execute the preview command.
pub fn execute_preview(config: &CliConfig, args: &PreviewArgs) -> CliResult<PreviewReport> {
    let preview = preview_config(args);
    let reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());

    let report = lesionlab::build_preview(&preview)?;

    match args.format {
        SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        SummaryFormat::Text => {
            if !config.verbosity.is_quiet() {
                print!("{}", render_preview_text(&report));
            }
        }
    }
    reporter.success(&format!("Wrote {}", report.output.display()));

    Ok(report)
}

/// Plain-text summary
#[must_use]
pub fn render_preview_text(report: &PreviewReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Animation:   {}\n", report.output.display()));
    if let Some(copy) = &report.viewer_copy {
        out.push_str(&format!("Viewer copy: {}\n", copy.display()));
    }
    out.push_str(&format!(
        "Frames:      {} written from {} file(s)",
        report.frames_written, report.source_frames
    ));
    if report.skipped_frames > 0 {
        out.push_str(&format!(", {} skipped", report.skipped_frames));
    }
    out.push('\n');
    out.push_str(&format!("Last frame:  {} (shown twice)\n", report.last_frame.display()));
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use crate::config::{ColorChoice, Verbosity};
    use clap::Parser;
    use image::{Rgba, RgbaImage};
    use std::path::{Path, PathBuf};

    fn parse(args: &[&str]) -> PreviewArgs {
        let argv = std::iter::once("lesionlab")
            .chain(std::iter::once("preview"))
            .chain(args.iter().copied());
        match Cli::parse_from(argv).command {
            Commands::Preview(args) => args,
            _ => unreachable!(),
        }
    }

    fn quiet() -> CliConfig {
        CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_color(ColorChoice::Never)
    }

    fn write_frames(dir: &Path, count: usize) {
        for i in 0..count {
            RgbaImage::from_pixel(4, 4, Rgba([(i * 40) as u8, 0, 0, 255]))
                .save(dir.join(format!("image_{i:04}.png")))
                .unwrap();
        }
    }

    #[test]
    fn test_preview_config_defaults() {
        let config = preview_config(&parse(&["frames", "-o", "out/t.gif"]));
        assert_eq!(config.frames_dir, PathBuf::from("frames"));
        assert_eq!(config.pattern, "image*.png");
        assert_eq!(config.viewer_copy, Some(PathBuf::from("out/t.gif.png")));
        assert_eq!(config.animation, AnimationConfig::default());
    }

    #[test]
    fn test_preview_config_overrides() {
        let config = preview_config(&parse(&[
            "frames",
            "--pattern",
            "epoch_*.png",
            "--viewer-copy",
            "view.png",
            "--fps",
            "5",
            "--quality",
            "100",
            "--loop-count",
            "2",
        ]));
        assert_eq!(config.pattern, "epoch_*.png");
        assert_eq!(config.viewer_copy, Some(PathBuf::from("view.png")));
        assert_eq!(config.animation.fps, 5);
        assert_eq!(config.animation.quality, 100);
        assert_eq!(config.animation.loop_count, 2);
    }

    #[test]
    fn test_preview_config_without_copy() {
        let config = preview_config(&parse(&["frames", "--no-viewer-copy"]));
        assert!(config.viewer_copy.is_none());
    }

    #[test]
    fn test_execute_preview() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), 3);
        let output = dir.path().join("t.gif");

        let args = parse(&[
            dir.path().to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]);
        let report = execute_preview(&quiet(), &args).unwrap();

        assert_eq!(report.frames_written, 4);
        assert!(output.exists());
        assert!(dir.path().join("t.gif.png").exists());
    }

    #[test]
    fn test_execute_preview_empty_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("t.gif");
        let args = parse(&[
            dir.path().to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]);

        assert!(execute_preview(&quiet(), &args).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_render_preview_text() {
        let report = PreviewReport {
            source_frames: 5,
            skipped_frames: 0,
            frames_written: 6,
            last_frame: PathBuf::from("f/image_0004.png"),
            output: PathBuf::from("t.gif"),
            viewer_copy: Some(PathBuf::from("t.gif.png")),
        };
        let text = render_preview_text(&report);
        assert!(text.contains("6 written from 5 file(s)"));
        assert!(text.contains("t.gif.png"));
        assert!(text.contains("image_0004.png (shown twice)"));
        assert!(!text.contains("skipped"));
    }
}
