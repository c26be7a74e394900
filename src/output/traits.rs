//! Reporter trait
//!
//! Reporters observe a batch run. They receive every item result as soon as it
//! is known and the final summary once the loop ends. Implementations must be
//! thread-safe.

use crate::pipeline::{BatchSummary, ItemReport};

/// Observer of batch progress
pub trait Reporter: Send + Sync {
    /// Records the outcome of a single item
    ///
    /// # Arguments
    ///
    /// * `report` - URL, index and outcome of the item
    fn report_item_result(&self, report: &ItemReport);

    /// Records the final summary of the run
    ///
    /// Called exactly once per run, including interrupted runs.
    fn report_summary(&self, summary: &BatchSummary);
}

/// Reporter that writes progress to the `tracing` log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report_item_result(&self, report: &ItemReport) {
        match &report.outcome {
            crate::pipeline::ItemOutcome::Saved { path } => {
                tracing::info!("[{}] Saved {} -> {}", report.index, report.url, path.display())
            }
            crate::pipeline::ItemOutcome::Failed { reason } => {
                tracing::error!("[{}] Failed {}: {}", report.index, report.url, reason)
            }
        }
    }

    fn report_summary(&self, summary: &BatchSummary) {
        tracing::info!(
            "Batch {}: {} saved, {} failed ({:.1}% success)",
            if summary.interrupted {
                "interrupted"
            } else {
                "complete"
            },
            summary.successful.len(),
            summary.failed.len(),
            summary.success_rate()
        );

        for failure in &summary.failed {
            tracing::warn!("  {}: {}", failure.url, failure.reason);
        }
    }
}
