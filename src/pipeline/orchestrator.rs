//! Batch orchestrator - main processing loop
//!
//! This module contains the loop that drives every URL of a batch through
//! fetch, transform, link normalization and persistence:
//! - Checking configuration before any network traffic
//! - Holding the fetch session for the length of the run
//! - Isolating per-item failures so one bad page never stops the batch
//! - Handling interrupts between items
//! - Reporting item results and the final summary

use super::item::{ItemState, ProcessingItem};
use super::shutdown::ShutdownSignal;
use super::summary::{BatchSummary, ItemOutcome, ItemReport};
use crate::config::{ScribeConfig, TransformConfig};
use crate::discovery::LinkDiscoverer;
use crate::fetch::{BatchFetcher, FetchOutcome, SessionGuard};
use crate::normalize::{absolutify, name_for};
use crate::output::Reporter;
use crate::persist::Persister;
use crate::retry::{retry_with_policy, TRANSFORM_POLICY};
use crate::transform::{offload_transform, BlockingWorker, Transformer};
use crate::{Result, ScribeError};
use std::sync::Arc;
use std::time::Duration;

/// Reason recorded for pages below the minimum content length
pub const EMPTY_CONTENT: &str = "empty content";

/// Reason recorded when a transform succeeds but yields nothing
pub const EMPTY_TRANSFORM: &str = "transform returned no content";

/// Main batch orchestrator structure
pub struct Orchestrator {
    config: Arc<ScribeConfig>,
    fetcher: Arc<dyn BatchFetcher>,
    transformer: Arc<dyn Transformer>,
    persister: Arc<dyn Persister>,
    reporters: Vec<Arc<dyn Reporter>>,
    shutdown: ShutdownSignal,
    worker: BlockingWorker,
}

impl Orchestrator {
    /// Creates a new orchestrator
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `fetcher` - Batch fetch collaborator
    /// * `transformer` - Blocking transform collaborator
    /// * `persister` - Artifact writer
    pub fn new(
        config: ScribeConfig,
        fetcher: Arc<dyn BatchFetcher>,
        transformer: Arc<dyn Transformer>,
        persister: Arc<dyn Persister>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
            transformer,
            persister,
            reporters: Vec::new(),
            shutdown: ShutdownSignal::new(),
            // One transform in flight at a time
            worker: BlockingWorker::new(1),
        }
    }

    /// Registers a reporter; reporters are notified in registration order
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    /// Uses `shutdown` instead of the orchestrator's own signal
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Handle that stops the batch before its next item
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub fn config(&self) -> &ScribeConfig {
        &self.config
    }

    /// Runs the batch over `urls`
    ///
    /// `urls` is the slice of the input list that starts at
    /// `pipeline.start-at`; output file indexes continue from that offset.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchSummary)` - Every URL is accounted for as saved or failed,
    ///   unless the run was interrupted
    /// * `Err(ScribeError)` - A fatal error: missing credential, a batch
    ///   fetch that broke its result-count contract, or an item state bug
    pub async fn process(&self, urls: &[String]) -> Result<BatchSummary> {
        // Fail before any network traffic if the transform cannot authenticate
        self.config.credential()?;

        let mut summary = BatchSummary::new();
        tracing::info!(
            "Processing {} URLs (index offset {})",
            urls.len(),
            self.config.pipeline.start_at
        );

        let _session = match &self.config.fetch.session_id {
            Some(session_id) => Some(SessionGuard::open(Arc::clone(&self.fetcher), session_id).await?),
            None => None,
        };

        let outcomes = self.fetcher.batch_fetch(urls, &self.config.fetch).await;
        if outcomes.len() != urls.len() {
            return Err(ScribeError::FetchCountMismatch {
                expected: urls.len(),
                actual: outcomes.len(),
            });
        }

        let fetched = outcomes.iter().filter(|o| o.is_success()).count();
        tracing::info!("Fetched {}/{} pages", fetched, urls.len());

        let delay = Duration::from_millis(self.config.pipeline.politeness_delay_ms);
        let total = urls.len();

        for (position, (url, outcome)) in urls.iter().zip(outcomes).enumerate() {
            if self.shutdown.is_requested() {
                tracing::warn!(
                    "Stopping before {} ({} of {} items left)",
                    url,
                    total - position,
                    total
                );
                summary.interrupted = true;
                break;
            }

            let index = self.config.pipeline.start_at + position + 1;
            tracing::info!("[{}/{}] Processing {}", position + 1, total, url);

            let mut item = ProcessingItem::new(url.as_str(), index);
            let outcome = self.process_item(&mut item, outcome).await?;
            let report = ItemReport {
                url: url.clone(),
                index,
                outcome,
            };

            summary.record(&report);
            for reporter in &self.reporters {
                reporter.report_item_result(&report);
            }

            if position + 1 < total && !delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = self.shutdown.wait() => {}
                }
            }
        }

        summary.finish();
        for reporter in &self.reporters {
            reporter.report_summary(&summary);
        }

        Ok(summary)
    }

    /// Discovers the pages linked from `start_url`, then runs the batch over them
    ///
    /// Unlike [`process`](Self::process), this owns the whole URL list, so it
    /// skips the first `pipeline.start-at` discovered links itself. A missing
    /// credential aborts before discovery, and discovery errors abort before
    /// any batch fetch.
    pub async fn discover_and_process(
        &self,
        discoverer: &LinkDiscoverer,
        start_url: &str,
    ) -> Result<BatchSummary> {
        // Same preflight as `process`, but ahead of the discovery fetch
        self.config.credential()?;

        let links = discoverer.discover(start_url).await?;
        let start_at = self.config.pipeline.start_at;

        let remaining = links.get(start_at..).unwrap_or_default();
        if remaining.len() < links.len() {
            tracing::info!(
                "Skipping the first {} of {} discovered links",
                links.len() - remaining.len(),
                links.len()
            );
        }

        self.process(remaining).await
    }

    /// Drives one item to a terminal state
    ///
    /// Item-level failures become `ItemOutcome::Failed`; only fatal errors are
    /// returned as `Err`.
    async fn process_item(
        &self,
        item: &mut ProcessingItem,
        outcome: FetchOutcome,
    ) -> Result<ItemOutcome> {
        let content = match outcome {
            FetchOutcome::Fetched { content } => {
                item.advance(ItemState::Fetched)?;
                content
            }
            FetchOutcome::Failed { error } => {
                item.advance(ItemState::FetchFailed)?;
                return Ok(ItemOutcome::Failed { reason: error });
            }
        };

        let length = content.chars().count();
        if length < self.config.pipeline.min_content_length {
            tracing::debug!("{} has only {} characters", item.url, length);
            item.advance(ItemState::ContentEmpty)?;
            return Ok(ItemOutcome::Failed {
                reason: EMPTY_CONTENT.to_string(),
            });
        }
        item.advance(ItemState::ContentOk)?;
        let source: Arc<str> = Arc::from(item.content.insert(content).as_str());

        let context = &self.config.transform;
        let url = item.url.as_str();
        let transformed = retry_with_policy(&TRANSFORM_POLICY, || {
            let attempt = offload_transform(
                &self.worker,
                Arc::clone(&self.transformer),
                Arc::clone(&source),
            );
            async move {
                attempt
                    .await
                    .map_err(|e| with_transform_context(e, context, url))
            }
        })
        .await;

        let text = match transformed {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                item.advance(ItemState::TransformFailed)?;
                return Ok(ItemOutcome::Failed {
                    reason: EMPTY_TRANSFORM.to_string(),
                });
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                item.advance(ItemState::TransformFailed)?;
                return Ok(ItemOutcome::Failed {
                    reason: e.to_string(),
                });
            }
        };
        item.advance(ItemState::Transformed)?;

        let output = &self.config.output;
        let document = item.transformed.insert(absolutify(&text, &item.url));
        let filename = name_for(
            &item.url,
            item.index,
            &output.extension,
            output.max_filename_length,
        );
        let path = output.directory.join(filename);

        match self.persister.persist(&path, document).await {
            Ok(()) => {
                item.advance(ItemState::Saved)?;
                Ok(ItemOutcome::Saved { path })
            }
            Err(e) => {
                item.advance(ItemState::SaveFailed)?;
                Ok(ItemOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }
}

/// Fills in the provider, model and URL a transform collaborator left unset
///
/// The provider decides the default rate-limit wait, so it has to be known
/// before the retry decision.
fn with_transform_context(error: ScribeError, config: &TransformConfig, url: &str) -> ScribeError {
    match error {
        ScribeError::RateLimit(mut e) => {
            if e.provider.is_none() {
                e.provider = config.provider().map(str::to_string);
            }
            e.url.get_or_insert_with(|| url.to_string());
            e.into()
        }
        ScribeError::Transform(mut e) => {
            if e.provider.is_none() {
                e.provider = config.provider().map(str::to_string);
            }
            e.model.get_or_insert_with(|| config.model.clone());
            e.url.get_or_insert_with(|| url.to_string());
            e.into()
        }
        ScribeError::Network(mut e) => {
            e.url.get_or_insert_with(|| url.to_string());
            e.into()
        }
        other => other,
    }
}

/// Runs one batch with a fresh [`Orchestrator`] and no reporters
pub async fn process_batch(
    urls: &[String],
    fetcher: Arc<dyn BatchFetcher>,
    transformer: Arc<dyn Transformer>,
    persister: Arc<dyn Persister>,
    config: &ScribeConfig,
) -> Result<BatchSummary> {
    Orchestrator::new(config.clone(), fetcher, transformer, persister)
        .process(urls)
        .await
}
