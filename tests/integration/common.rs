//! Scripted collaborators shared by the integration tests

use async_trait::async_trait;
use scroll_scribe::config::{FetchConfig, ScribeConfig};
use scroll_scribe::fetch::{BatchFetcher, FetchOutcome};
use scroll_scribe::output::Reporter;
use scroll_scribe::persist::{FsPersister, Persister};
use scroll_scribe::pipeline::{BatchSummary, ItemReport, ShutdownSignal};
use scroll_scribe::retry::PersistOperation;
use scroll_scribe::transform::{TransformOutput, Transformer};
use scroll_scribe::{PersistError, ScribeError, TransformError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A page body long enough to pass the content check
pub fn page(body: &str) -> String {
    format!(
        "<html><body><h1>{}</h1><p>{}</p><p><a href=\"/next\">next</a></p></body></html>",
        body,
        "lorem ipsum dolor sit amet ".repeat(5)
    )
}

pub fn urls(paths: &[&str]) -> Vec<String> {
    paths
        .iter()
        .map(|path| format!("https://site.com{}", path))
        .collect()
}

/// Configuration writing into `dir` without politeness delays
pub fn test_config(dir: &Path) -> ScribeConfig {
    let mut config = ScribeConfig::default();
    config.output.directory = dir.to_path_buf();
    config.pipeline.politeness_delay_ms = 0;
    config.fetch.session_id = Some("test-session".to_string());
    config
}

/// Batch fetcher returning preset outcomes and recording its calls
#[derive(Default)]
pub struct ScriptedFetcher {
    outcomes: Vec<FetchOutcome>,
    pub batch_calls: AtomicUsize,
    pub events: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new(outcomes: Vec<FetchOutcome>) -> Self {
        Self {
            outcomes,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchFetcher for ScriptedFetcher {
    async fn batch_fetch(&self, _urls: &[String], _config: &FetchConfig) -> Vec<FetchOutcome> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes.clone()
    }

    async fn open_session(&self, session_id: &str) -> scroll_scribe::Result<()> {
        self.events.lock().unwrap().push(format!("open {}", session_id));
        Ok(())
    }

    fn release_session(&self, session_id: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("release {}", session_id));
    }
}

pub fn fetched(content: impl Into<String>) -> FetchOutcome {
    FetchOutcome::Fetched {
        content: content.into(),
    }
}

pub fn failed(error: &str) -> FetchOutcome {
    FetchOutcome::Failed {
        error: error.to_string(),
    }
}

/// How the scripted transformer treats content containing a marker
#[derive(Clone)]
pub enum Behaviour {
    /// Always fails with this message
    Fail(&'static str),
    /// Returns an empty document
    Empty,
    /// Requests shutdown, then succeeds
    Interrupt(ShutdownSignal),
    /// Fails the first attempt with the built error, then succeeds
    FailFirst(fn() -> ScribeError),
}

/// Transformer that echoes content unless a marker selects a scripted behaviour
#[derive(Default)]
pub struct ScriptedTransformer {
    rules: Vec<(&'static str, Behaviour)>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedTransformer {
    pub fn echo() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, marker: &'static str, behaviour: Behaviour) -> Self {
        self.rules.push((marker, behaviour));
        self
    }

    /// Number of transform attempts made on content containing `marker`
    pub fn calls_for(&self, marker: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(content, _)| content.contains(marker))
            .map(|(_, count)| *count)
            .sum()
    }
}

impl Transformer for ScriptedTransformer {
    fn transform(&self, content: &str) -> scroll_scribe::Result<TransformOutput> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(content.to_string()).or_default();
            *count += 1;
            *count
        };

        for (marker, behaviour) in &self.rules {
            if !content.contains(marker) {
                continue;
            }
            match behaviour {
                Behaviour::Fail(message) => {
                    return Err(ScribeError::from(TransformError::new(*message)))
                }
                Behaviour::Empty => return Ok(TransformOutput::Text("   ".to_string())),
                Behaviour::Interrupt(signal) => {
                    signal.request();
                }
                Behaviour::FailFirst(build) if attempt == 1 => return Err(build()),
                Behaviour::FailFirst(_) => {}
            }
        }

        Ok(TransformOutput::Text(format!("# Doc\n\n[next](/next)\n\n{}", content.len())))
    }
}

/// Writes through to disk unless the file name contains `denied`
pub struct PickyPersister;

#[async_trait]
impl Persister for PickyPersister {
    async fn persist(&self, path: &Path, content: &str) -> Result<(), PersistError> {
        if path.to_string_lossy().contains("denied") {
            return Err(PersistError::new(
                "Permission denied",
                path,
                PersistOperation::Write,
            ));
        }
        FsPersister.persist(path, content).await
    }
}

/// Reporter that keeps everything it is told
#[derive(Default)]
pub struct CollectingReporter {
    pub items: Mutex<Vec<ItemReport>>,
    pub summaries: Mutex<Vec<BatchSummary>>,
}

impl Reporter for CollectingReporter {
    fn report_item_result(&self, report: &ItemReport) {
        self.items.lock().unwrap().push(report.clone());
    }

    fn report_summary(&self, summary: &BatchSummary) {
        self.summaries.lock().unwrap().push(summary.clone());
    }
}
