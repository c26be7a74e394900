//! Batch orchestrator behaviour with scripted collaborators

use crate::common::*;
use scroll_scribe::pipeline::{
    process_batch, FailedItem, ItemOutcome, Orchestrator, ShutdownSignal, EMPTY_CONTENT,
    EMPTY_TRANSFORM,
};
use scroll_scribe::persist::FsPersister;
use scroll_scribe::{ConfigError, NetworkError, RateLimitError, ScribeError};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_connection_refused_is_isolated() {
    let dir = TempDir::new().unwrap();
    let urls = urls(&["/intro", "/install", "/usage"]);
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        fetched(page("Intro")),
        failed("Connection refused"),
        fetched(page("Usage")),
    ]));

    let summary = process_batch(
        &urls,
        fetcher.clone(),
        Arc::new(ScriptedTransformer::echo()),
        Arc::new(FsPersister),
        &test_config(dir.path()),
    )
    .await
    .unwrap();

    assert_eq!(summary.successful, vec![urls[0].clone(), urls[2].clone()]);
    assert_eq!(
        summary.failed,
        vec![FailedItem {
            url: urls[1].clone(),
            reason: "Connection refused".to_string()
        }]
    );
    assert!(!summary.interrupted);
    assert!(summary.finished_at.is_some());

    let first = std::fs::read_to_string(dir.path().join("page_001_intro.md")).unwrap();
    assert!(first.contains("[next](https://site.com/next)"));
    assert!(dir.path().join("page_003_usage.md").exists());
    assert!(!dir.path().join("page_002_install.md").exists());

    assert_eq!(fetcher.batch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        fetcher.events(),
        vec!["open test-session", "release test-session"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_transform_failure_retried_then_isolated() {
    let dir = TempDir::new().unwrap();
    let urls = urls(&["/a", "/b", "/c"]);
    let transformer = Arc::new(
        ScriptedTransformer::echo().with_rule("BROKEN", Behaviour::Fail("upstream returned 502")),
    );
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        fetched(page("A")),
        fetched(page("BROKEN")),
        fetched(page("C")),
    ]));

    let summary = process_batch(
        &urls,
        fetcher,
        transformer.clone(),
        Arc::new(FsPersister),
        &test_config(dir.path()),
    )
    .await
    .unwrap();

    assert_eq!(transformer.calls_for("BROKEN"), 5);
    assert_eq!(transformer.calls_for("<h1>A</h1>"), 1);
    assert_eq!(summary.successful, vec![urls[0].clone(), urls[2].clone()]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].url, urls[1]);
    assert_eq!(summary.failed[0].reason, "upstream returned 502");
}

#[tokio::test(start_paused = true)]
async fn test_transform_network_blip_is_retried() {
    let dir = TempDir::new().unwrap();
    let urls = urls(&["/a"]);
    let transformer = Arc::new(ScriptedTransformer::echo().with_rule(
        "Blip",
        Behaviour::FailFirst(|| NetworkError::new("Connection reset by peer").into()),
    ));

    let summary = process_batch(
        &urls,
        Arc::new(ScriptedFetcher::new(vec![fetched(page("Blip"))])),
        transformer.clone(),
        Arc::new(FsPersister),
        &test_config(dir.path()),
    )
    .await
    .unwrap();

    assert_eq!(transformer.calls_for("Blip"), 2);
    assert_eq!(summary.successful, urls);
    assert!(summary.failed.is_empty());
    assert!(dir.path().join("page_001_a.md").exists());
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_waits_for_configured_provider() {
    let dir = TempDir::new().unwrap();
    let urls = urls(&["/busy"]);
    let transformer = Arc::new(ScriptedTransformer::echo().with_rule(
        "Busy",
        Behaviour::FailFirst(|| RateLimitError::new("429 Too Many Requests").into()),
    ));
    let config = test_config(dir.path());
    assert_eq!(config.transform.provider(), Some("openrouter"));

    let started = tokio::time::Instant::now();
    let summary = process_batch(
        &urls,
        Arc::new(ScriptedFetcher::new(vec![fetched(page("Busy"))])),
        transformer.clone(),
        Arc::new(FsPersister),
        &config,
    )
    .await
    .unwrap();

    assert_eq!(transformer.calls_for("Busy"), 2);
    assert_eq!(summary.successful, urls);
    assert_eq!(started.elapsed(), Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_uses_generic_wait_for_other_providers() {
    let dir = TempDir::new().unwrap();
    let transformer = Arc::new(ScriptedTransformer::echo().with_rule(
        "Busy",
        Behaviour::FailFirst(|| RateLimitError::new("429 Too Many Requests").into()),
    ));
    let mut config = test_config(dir.path());
    config.transform.model = "openai/gpt-4o-mini".to_string();

    let started = tokio::time::Instant::now();
    let summary = process_batch(
        &urls(&["/busy"]),
        Arc::new(ScriptedFetcher::new(vec![fetched(page("Busy"))])),
        transformer,
        Arc::new(FsPersister),
        &config,
    )
    .await
    .unwrap();

    assert_eq!(summary.successful.len(), 1);
    assert_eq!(started.elapsed(), Duration::from_secs(30));
}

#[tokio::test]
async fn test_permanent_transform_error_not_retried() {
    let dir = TempDir::new().unwrap();
    let urls = urls(&["/huge"]);
    let transformer = Arc::new(ScriptedTransformer::echo().with_rule(
        "Huge",
        Behaviour::Fail("maximum context length exceeded"),
    ));

    let summary = process_batch(
        &urls,
        Arc::new(ScriptedFetcher::new(vec![fetched(page("Huge"))])),
        transformer.clone(),
        Arc::new(FsPersister),
        &test_config(dir.path()),
    )
    .await
    .unwrap();

    assert_eq!(transformer.calls_for("Huge"), 1);
    assert_eq!(summary.failed[0].reason, "maximum context length exceeded");
}

#[tokio::test]
async fn test_every_url_accounted_for_in_order() {
    let dir = TempDir::new().unwrap();
    let urls = urls(&["/ok-1", "/down", "/tiny", "/blank", "/denied", "/ok-2"]);
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        fetched(page("one")),
        failed("HTTP 503 Service Unavailable"),
        fetched("<p>tiny</p>"),
        fetched(page("BLANK")),
        fetched(page("denied")),
        fetched(page("two")),
    ]));
    let transformer =
        Arc::new(ScriptedTransformer::echo().with_rule("BLANK", Behaviour::Empty));
    let reporter = Arc::new(CollectingReporter::default());

    let orchestrator = Orchestrator::new(
        test_config(dir.path()),
        fetcher,
        transformer,
        Arc::new(PickyPersister),
    )
    .with_reporter(reporter.clone());

    let summary = orchestrator.process(&urls).await.unwrap();

    assert_eq!(summary.total(), urls.len());
    assert_eq!(summary.successful, vec![urls[0].clone(), urls[5].clone()]);

    let reasons: Vec<_> = summary
        .failed
        .iter()
        .map(|f| (f.url.as_str(), f.reason.as_str()))
        .collect();
    assert_eq!(reasons[0], (urls[1].as_str(), "HTTP 503 Service Unavailable"));
    assert_eq!(reasons[1], (urls[2].as_str(), EMPTY_CONTENT));
    assert_eq!(reasons[2], (urls[3].as_str(), EMPTY_TRANSFORM));
    assert_eq!(reasons[3].0, urls[4].as_str());
    assert!(reasons[3].1.contains("Permission denied"));

    let items = reporter.items.lock().unwrap();
    assert_eq!(items.len(), 6);
    assert_eq!(
        items.iter().map(|i| i.index).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5, 6]
    );
    assert!(matches!(items[5].outcome, ItemOutcome::Saved { .. }));
    assert_eq!(reporter.summaries.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_credential_aborts_before_fetch() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.transform.api_key_env = Some("SCROLL_SCRIBE_IT_MISSING_KEY".to_string());
    let fetcher = Arc::new(ScriptedFetcher::new(vec![fetched(page("x"))]));

    let error = process_batch(
        &urls(&["/x"]),
        fetcher.clone(),
        Arc::new(ScriptedTransformer::echo()),
        Arc::new(FsPersister),
        &config,
    )
    .await
    .unwrap_err();

    assert!(error.is_fatal());
    assert!(matches!(
        error,
        ScribeError::Config(ConfigError::MissingCredential { .. })
    ));
    assert_eq!(fetcher.batch_calls.load(Ordering::SeqCst), 0);
    assert!(fetcher.events().is_empty());
}

#[tokio::test]
async fn test_fetch_count_mismatch_is_fatal() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new(vec![fetched(page("only one"))]));

    let error = process_batch(
        &urls(&["/a", "/b"]),
        fetcher.clone(),
        Arc::new(ScriptedTransformer::echo()),
        Arc::new(FsPersister),
        &test_config(dir.path()),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        error,
        ScribeError::FetchCountMismatch {
            expected: 2,
            actual: 1
        }
    ));
    assert_eq!(
        fetcher.events(),
        vec!["open test-session", "release test-session"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_stops_before_next_item() {
    let dir = TempDir::new().unwrap();
    let urls = urls(&["/first", "/second", "/third"]);
    let shutdown = ShutdownSignal::new();
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        fetched(page("STOP")),
        fetched(page("second")),
        fetched(page("third")),
    ]));
    let transformer = Arc::new(
        ScriptedTransformer::echo().with_rule("STOP", Behaviour::Interrupt(shutdown.clone())),
    );
    let reporter = Arc::new(CollectingReporter::default());

    let mut config = test_config(dir.path());
    config.pipeline.politeness_delay_ms = 60_000;

    let summary = Orchestrator::new(config, fetcher.clone(), transformer.clone(), Arc::new(FsPersister))
        .with_shutdown(shutdown)
        .with_reporter(reporter.clone())
        .process(&urls)
        .await
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.successful, vec![urls[0].clone()]);
    assert!(summary.failed.is_empty());
    assert_eq!(transformer.calls_for("second"), 0);
    assert_eq!(reporter.items.lock().unwrap().len(), 1);
    assert_eq!(reporter.summaries.lock().unwrap().len(), 1);
    assert_eq!(
        fetcher.events(),
        vec!["open test-session", "release test-session"]
    );
}

#[tokio::test]
async fn test_interrupt_wakes_politeness_delay() {
    let dir = TempDir::new().unwrap();
    let urls = urls(&["/first", "/second"]);
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        fetched(page("first")),
        fetched(page("second")),
    ]));
    let transformer = Arc::new(ScriptedTransformer::echo());
    let reporter = Arc::new(CollectingReporter::default());

    let mut config = test_config(dir.path());
    config.pipeline.politeness_delay_ms = 30_000;

    let orchestrator = Orchestrator::new(config, fetcher, transformer.clone(), Arc::new(FsPersister))
        .with_reporter(reporter.clone());
    let shutdown = orchestrator.shutdown_signal();

    // Interrupt once the first item is reported, i.e. while the loop sleeps
    let interrupter = {
        let reporter = reporter.clone();
        tokio::spawn(async move {
            loop {
                let reported = !reporter.items.lock().unwrap().is_empty();
                if reported {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            shutdown.request();
        })
    };

    let started = std::time::Instant::now();
    let summary = tokio::time::timeout(Duration::from_secs(10), orchestrator.process(&urls))
        .await
        .expect("shutdown should cut the politeness delay short")
        .unwrap();
    interrupter.await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(summary.interrupted);
    assert_eq!(summary.successful, vec![urls[0].clone()]);
    assert_eq!(transformer.calls_for("second"), 0);
}

#[tokio::test]
async fn test_start_offset_continues_numbering() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.pipeline.start_at = 10;
    config.fetch.session_id = None;
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        fetched(page("k")),
        fetched(page("l")),
    ]));

    let summary = process_batch(
        &urls(&["/k", "/l"]),
        fetcher.clone(),
        Arc::new(ScriptedTransformer::echo()),
        Arc::new(FsPersister),
        &config,
    )
    .await
    .unwrap();

    assert_eq!(summary.successful.len(), 2);
    assert!(dir.path().join("page_011_k.md").exists());
    assert!(dir.path().join("page_012_l.md").exists());
    assert!(fetcher.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_politeness_delay_between_items_only() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.pipeline.politeness_delay_ms = 1000;
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        fetched(page("1")),
        fetched(page("2")),
        fetched(page("3")),
    ]));

    let started = tokio::time::Instant::now();
    let summary = process_batch(
        &urls(&["/1", "/2", "/3"]),
        fetcher,
        Arc::new(ScriptedTransformer::echo()),
        Arc::new(FsPersister),
        &config,
    )
    .await
    .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(summary.successful.len(), 3);
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_secs(3));
}

#[tokio::test]
async fn test_empty_batch() {
    let dir = TempDir::new().unwrap();

    let summary = process_batch(
        &[],
        Arc::new(ScriptedFetcher::new(Vec::new())),
        Arc::new(ScriptedTransformer::echo()),
        Arc::new(FsPersister),
        &test_config(dir.path()),
    )
    .await
    .unwrap();

    assert_eq!(summary.total(), 0);
    assert!(!summary.interrupted);
}
