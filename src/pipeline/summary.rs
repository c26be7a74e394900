//! Per-item results and the aggregated batch summary

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// A URL that did not make it to disk, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    pub url: String,
    pub reason: String,
}

/// How a single item ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Saved { path: PathBuf },
    Failed { reason: String },
}

/// Result of one item, handed to reporters as soon as it is known
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub url: String,
    /// 1-based position used for the output file name
    pub index: usize,
    pub outcome: ItemOutcome,
}

impl ItemReport {
    pub fn saved(url: &str, index: usize, path: PathBuf) -> Self {
        Self {
            url: url.to_string(),
            index,
            outcome: ItemOutcome::Saved { path },
        }
    }

    pub fn failed(url: &str, index: usize, reason: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            index,
            outcome: ItemOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Saved { .. })
    }
}

/// Outcome of a whole batch run
///
/// Unless the run was interrupted, every input URL appears exactly once,
/// either in `successful` or in `failed`, in input order.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub successful: Vec<String>,
    pub failed: Vec<FailedItem>,
    /// Set when a shutdown request stopped the loop early
    pub interrupted: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for BatchSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchSummary {
    /// Creates an empty summary stamped with the current time
    pub fn new() -> Self {
        Self {
            successful: Vec::new(),
            failed: Vec::new(),
            interrupted: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Folds one item result into the summary
    pub fn record(&mut self, report: &ItemReport) {
        match &report.outcome {
            ItemOutcome::Saved { .. } => self.successful.push(report.url.clone()),
            ItemOutcome::Failed { reason } => self.failed.push(FailedItem {
                url: report.url.clone(),
                reason: reason.clone(),
            }),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of items with a recorded outcome
    pub fn total(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.successful.len() as f64 / total as f64) * 100.0
    }

    /// Wall-clock duration, once the run has finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|finished| finished - self.started_at)
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}
