//! Outputs command handler.

use crate::commands::{OutputsArgs, SummaryFormat};
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::format_size;
use console::style;
use lesionlab::{latest_preview_epoch, OutputInventory, OutputKind};
use serde::Serialize;

/// Inventory plus the newest preview epoch
#[derive(Debug, Serialize)]
pub struct OutputsSummary {
    /// Files in the directory
    pub inventory: OutputInventory,
    /// Newest preview epoch, if any
    pub latest_epoch: Option<u32>,
}

/// Collect the summary for `args.dir`
pub fn collect_outputs(args: &OutputsArgs) -> CliResult<OutputsSummary> {
    let inventory = OutputInventory::scan(&args.dir)?;
    let latest_epoch = latest_preview_epoch(&args.dir, &args.pattern)?;
    Ok(OutputsSummary {
        inventory,
        latest_epoch,
    })
}

/// Execute the outputs command.
pub fn execute_outputs(config: &CliConfig, args: &OutputsArgs) -> CliResult<()> {
    let summary = collect_outputs(args)?;
    match args.format {
        SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        SummaryFormat::Text => print!("{}", render_outputs_text(&summary, config.color.should_color())),
    }
    Ok(())
}

/// Plain-text listing
#[must_use]
pub fn render_outputs_text(summary: &OutputsSummary, color: bool) -> String {
    let inventory = &summary.inventory;
    let mut out = format!("{}\n", inventory.dir.display());

    for entry in &inventory.entries {
        let tag = match entry.kind {
            OutputKind::Preview => "preview",
            OutputKind::Checkpoint => "checkpoint",
            OutputKind::Other => "other",
        };
        let tag = if color {
            match entry.kind {
                OutputKind::Preview => style(tag).cyan().to_string(),
                OutputKind::Checkpoint => style(tag).green().to_string(),
                OutputKind::Other => style(tag).dim().to_string(),
            }
        } else {
            tag.to_string()
        };
        out.push_str(&format!("  {:>10}  {tag:<10}  {}\n", format_size(entry.size), entry.name));
    }

    out.push_str(&format!(
        "{} preview, {} checkpoint, {} other ({})\n",
        inventory.count(OutputKind::Preview),
        inventory.count(OutputKind::Checkpoint),
        inventory.count(OutputKind::Other),
        format_size(inventory.total_size()),
    ));
    match summary.latest_epoch {
        Some(epoch) => out.push_str(&format!("Latest preview epoch: {epoch}\n")),
        None => out.push_str("Latest preview epoch: none\n"),
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;

    fn args(dir: &std::path::Path) -> OutputsArgs {
        OutputsArgs {
            dir: dir.to_path_buf(),
            pattern: "image*.png".to_string(),
            format: SummaryFormat::Text,
        }
    }

    #[test]
    fn test_collect_and_render() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("image_0002.png"), b"ab").unwrap();
        fs::write(dir.path().join("model.ckpt-2.index"), b"abcd").unwrap();

        let summary = collect_outputs(&args(dir.path())).unwrap();
        assert_eq!(summary.latest_epoch, Some(2));

        let text = render_outputs_text(&summary, false);
        assert!(text.contains("1 preview, 1 checkpoint, 0 other (6 B)"));
        assert!(text.contains("Latest preview epoch: 2"));
        assert!(text.contains("checkpoint  "));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let summary = collect_outputs(&args(dir.path())).unwrap();
        let text = render_outputs_text(&summary, false);
        assert!(text.contains("Latest preview epoch: none"));
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_outputs(&args(&dir.path().join("nope"))).is_err());
    }

    #[test]
    fn test_summary_serializes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("image_0001.png"), b"").unwrap();
        let summary = collect_outputs(&args(dir.path())).unwrap();

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"latest_epoch\":1"));
        assert!(json.contains("\"kind\":\"preview\""));
    }
}
