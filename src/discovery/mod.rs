//! Single-page link discovery
//!
//! Fetches the start page once and turns its anchors into an ordered,
//! deduplicated list of same-origin page URLs. Discovery never follows the
//! links it finds.

mod url_list;

pub use url_list::{read_urls_from_file, save_links};

use crate::config::FetchConfig;
use crate::fetch::{Anchor, PageFetcher};
use crate::retry::{error_from_message, retry_with_policy, FETCH_POLICY};
use crate::{Result, UrlError};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Discovers the pages linked from a start page
pub struct LinkDiscoverer {
    fetcher: Arc<dyn PageFetcher>,
    config: FetchConfig,
}

impl LinkDiscoverer {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: FetchConfig) -> Self {
        Self { fetcher, config }
    }

    /// Returns the same-origin URLs linked from `start_url`, in first-seen order
    ///
    /// The whole operation runs under the fetch retry policy, so transient
    /// network failures are retried with backoff while URL errors fail fast.
    ///
    /// # Errors
    ///
    /// * `UrlError` - `start_url` is not an absolute http(s) URL, or the fetch
    ///   collaborator reported a URL problem
    /// * `NetworkError` - the page could not be fetched after all attempts
    pub async fn discover(&self, start_url: &str) -> Result<Vec<String>> {
        tracing::info!("Discovering links on {}", start_url);

        let links = retry_with_policy(&FETCH_POLICY, || self.discover_once(start_url)).await?;

        tracing::info!("Found {} same-origin links on {}", links.len(), start_url);
        Ok(links)
    }

    async fn discover_once(&self, start_url: &str) -> Result<Vec<String>> {
        let start = parse_start_url(start_url)?;
        let page = self.fetcher.fetch_page(start.as_str(), &self.config).await?;

        if !page.success {
            let message = page.error.as_deref().unwrap_or("Unknown fetch error");
            return Err(error_from_message(message, start_url));
        }

        Ok(collect_links(&start, &page.links))
    }
}

/// Parses and checks the start URL, dropping its fragment
fn parse_start_url(start_url: &str) -> std::result::Result<Url, UrlError> {
    let mut url = Url::parse(start_url.trim()).map_err(|e| UrlError::Parse {
        url: start_url.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme {
            url: start_url.to_string(),
            scheme: url.scheme().to_string(),
        });
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost {
            url: start_url.to_string(),
        });
    }

    url.set_fragment(None);
    Ok(url)
}

/// Filters `anchors` found on `start` down to unique same-origin page URLs
///
/// For each href, in order: empty hrefs and fragment-only hrefs are skipped,
/// the fragment is stripped, the rest is resolved against `start`, links back
/// to `start` itself and links to another origin (scheme, host and port) are
/// skipped, and the first occurrence of every URL is kept.
pub fn collect_links(start: &Url, anchors: &[Anchor]) -> Vec<String> {
    let mut start = start.clone();
    start.set_fragment(None);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in anchors {
        let href = anchor.href.trim();
        let without_fragment = href.split('#').next().unwrap_or_default();
        if without_fragment.is_empty() {
            continue;
        }

        let mut resolved = match start.join(without_fragment) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::debug!("Skipping unresolvable href '{}': {}", href, e);
                continue;
            }
        };
        resolved.set_fragment(None);

        if resolved == start {
            continue;
        }

        if resolved.origin() != start.origin() {
            tracing::debug!("Skipping external link {}", resolved);
            continue;
        }

        let link = resolved.to_string();
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    links
}
