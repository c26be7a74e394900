//! Output module for reporting batch progress and results
//!
//! This module handles:
//! - The [`Reporter`] observer interface used by the batch orchestrator
//! - Logging progress through `tracing`
//! - Writing a markdown summary of each run

mod markdown;
mod traits;

pub use markdown::{format_markdown_summary, generate_markdown_summary, MarkdownSummaryReporter, RunInfo};
pub use traits::{Reporter, TracingReporter};
