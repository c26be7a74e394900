//! Markdown summary generation
//!
//! This module generates a human-readable `summary.md` for a batch run,
//! including run metadata, statistics, saved documents and failures.

use super::traits::Reporter;
use crate::pipeline::{BatchSummary, ItemOutcome, ItemReport};
use crate::retry::PersistOperation;
use crate::PersistError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Run metadata printed at the top of the summary
#[derive(Debug, Clone, Default)]
pub struct RunInfo {
    pub config_hash: Option<String>,
    pub model: Option<String>,
}

/// Writes the summary of a batch as markdown
///
/// # Arguments
///
/// * `summary` - The batch summary
/// * `items` - Item results in the order they were reported
/// * `info` - Run metadata
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(
    summary: &BatchSummary,
    items: &[ItemReport],
    info: &RunInfo,
    output_path: &Path,
) -> Result<(), PersistError> {
    let markdown = format_markdown_summary(summary, items, info);

    std::fs::write(output_path, markdown)
        .map_err(|e| PersistError::from_io(e, output_path, PersistOperation::Write))
}

/// Formats a batch summary as markdown
pub fn format_markdown_summary(summary: &BatchSummary, items: &[ItemReport], info: &RunInfo) -> String {
    let mut md = String::new();

    md.push_str("# Scroll-Scribe Run Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Started**: {}\n",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!(
            "- **Finished**: {}\n",
            finished.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    if let Some(duration) = summary.duration() {
        md.push_str(&format!(
            "- **Duration**: {} seconds\n",
            duration.num_seconds()
        ));
    }
    md.push_str(&format!(
        "- **Status**: {}\n",
        if summary.interrupted {
            "interrupted"
        } else {
            "completed"
        }
    ));
    if let Some(model) = &info.model {
        md.push_str(&format!("- **Model**: {}\n", model));
    }
    if let Some(hash) = &info.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Processed**: {}\n", summary.total()));
    md.push_str(&format!("- **Saved**: {}\n", summary.successful.len()));
    md.push_str(&format!("- **Failed**: {}\n", summary.failed.len()));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        summary.success_rate()
    ));

    let saved: Vec<_> = items
        .iter()
        .filter_map(|item| match &item.outcome {
            ItemOutcome::Saved { path } => Some((item, path)),
            ItemOutcome::Failed { .. } => None,
        })
        .collect();

    if !saved.is_empty() {
        md.push_str("## Saved Documents\n\n");
        md.push_str("| # | URL | File |\n");
        md.push_str("|---|-----|------|\n");
        for (item, path) in saved {
            let file = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            md.push_str(&format!("| {} | {} | {} |\n", item.index, item.url, file));
        }
        md.push('\n');
    }

    if !summary.failed.is_empty() {
        md.push_str("## Failures\n\n");
        md.push_str("| URL | Reason |\n");
        md.push_str("|-----|--------|\n");
        for failure in &summary.failed {
            md.push_str(&format!(
                "| {} | {} |\n",
                failure.url,
                escape_cell(&failure.reason)
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Reporter that collects item results and writes `summary.md` at the end
#[derive(Debug)]
pub struct MarkdownSummaryReporter {
    path: PathBuf,
    info: RunInfo,
    items: Mutex<Vec<ItemReport>>,
}

impl MarkdownSummaryReporter {
    pub fn new(path: impl Into<PathBuf>, info: RunInfo) -> Self {
        Self {
            path: path.into(),
            info,
            items: Mutex::new(Vec::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Reporter for MarkdownSummaryReporter {
    fn report_item_result(&self, report: &ItemReport) {
        if let Ok(mut items) = self.items.lock() {
            items.push(report.clone());
        }
    }

    fn report_summary(&self, summary: &BatchSummary) {
        let items = match self.items.lock() {
            Ok(items) => items.clone(),
            Err(_) => Vec::new(),
        };

        match generate_markdown_summary(summary, &items, &self.info, &self.path) {
            Ok(()) => tracing::info!("Summary written to {}", self.path.display()),
            Err(e) => tracing::error!("Failed to write summary: {}", e),
        }
    }
}
