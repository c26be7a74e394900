//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the default fetch
//! collaborator:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests for link discovery and for batch content fetches
//! - Bounded concurrency inside a batch
//! - Error classification into typed network errors

use super::parser::extract_anchors;
use super::{BatchFetcher, FetchOutcome, PageFetch, PageFetcher};
use crate::config::FetchConfig;
use crate::{NetworkError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetchConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_millis(config.timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain-HTTP fetch collaborator
///
/// Pages are fetched without rendering, so `wait-until` has no effect here.
pub struct HttpFetcher {
    client: Client,
    active_session: Mutex<Option<String>>,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> std::result::Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            active_session: Mutex::new(None),
        }
    }

    /// Session currently held by this fetcher, if any
    pub fn active_session(&self) -> Option<String> {
        self.active_session
            .lock()
            .ok()
            .and_then(|session| session.clone())
    }
}

/// Fetches `url` and returns its body as text
///
/// # Error Mapping
///
/// | Condition | Error |
/// |-----------|-------|
/// | Timeout | `NetworkError` "Request timeout" |
/// | Connect failure | `NetworkError` "Connection failed" |
/// | Non-2xx status | `NetworkError` "HTTP <status>" with status code |
/// | Body read failure | `NetworkError` with the reqwest message |
async fn get_text(client: &Client, url: &str, timeout: Duration) -> Result<String> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| request_error(e, url))?;

    let status = response.status();
    if !status.is_success() {
        return Err(NetworkError::new(format!("HTTP {}", status))
            .with_url(url)
            .with_status(status.as_u16())
            .into());
    }

    response.text().await.map_err(|e| request_error(e, url))
}

/// Classifies a reqwest error
fn request_error(error: reqwest::Error, url: &str) -> crate::ScribeError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection failed".to_string()
    } else {
        error.to_string()
    };

    let mut network = NetworkError::new(message).with_url(url);
    if let Some(status) = error.status() {
        network = network.with_status(status.as_u16());
    }
    network.with_source(error).into()
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str, config: &FetchConfig) -> Result<PageFetch> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let body = get_text(&self.client, url, timeout).await?;
        let parsed = extract_anchors(&body);

        tracing::debug!(
            "Fetched {} ({}): {} anchors",
            url,
            parsed.title.as_deref().unwrap_or("untitled"),
            parsed.anchors.len()
        );

        Ok(PageFetch::ok(parsed.anchors))
    }
}

#[async_trait]
impl BatchFetcher for HttpFetcher {
    async fn batch_fetch(&self, urls: &[String], config: &FetchConfig) -> Vec<FetchOutcome> {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_requests.max(1)));
        let timeout = Duration::from_millis(config.timeout_ms);

        tracing::info!(
            "Fetching {} pages ({} concurrent)",
            urls.len(),
            config.max_concurrent_requests
        );

        let handles: Vec<_> = urls
            .iter()
            .map(|url| {
                let client = self.client.clone();
                let semaphore = Arc::clone(&semaphore);
                let url = url.clone();

                tokio::spawn(async move {
                    // Permit is dropped when this block exits
                    let _permit = semaphore.acquire_owned().await;

                    match get_text(&client, &url, timeout).await {
                        Ok(content) => FetchOutcome::Fetched { content },
                        Err(e) => {
                            tracing::debug!("Fetch failed for {}: {}", url, e);
                            FetchOutcome::Failed {
                                error: e.to_string(),
                            }
                        }
                    }
                })
            })
            .collect();

        // Handles are awaited in input order, which keeps results paired
        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            let outcome = handle.await.unwrap_or_else(|e| FetchOutcome::Failed {
                error: format!("fetch task aborted: {}", e),
            });
            outcomes.push(outcome);
        }

        outcomes
    }

    async fn open_session(&self, session_id: &str) -> Result<()> {
        if let Ok(mut session) = self.active_session.lock() {
            *session = Some(session_id.to_string());
        }
        Ok(())
    }

    fn release_session(&self, session_id: &str) {
        if let Ok(mut session) = self.active_session.lock() {
            if session.as_deref() == Some(session_id) {
                *session = None;
            }
        }
    }
}
