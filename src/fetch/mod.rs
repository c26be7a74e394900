//! Fetch collaborators
//!
//! The pipeline only talks to the traits in this module. [`HttpFetcher`] is
//! the default implementation; anything that can turn a URL into page content
//! (a headless browser, a cache, a test double) can stand in for it.

mod http;
mod parser;

pub use http::{build_http_client, HttpFetcher};
pub use parser::{extract_anchors, ParsedPage};

use crate::config::FetchConfig;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A link target exactly as written in the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
}

impl Anchor {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// Result of fetching a single page for link discovery
///
/// A collaborator either returns a typed error or a `PageFetch`; an
/// unsuccessful `PageFetch` carries only a message, which is classified by
/// keyword when it reaches the discoverer.
#[derive(Debug, Clone, Default)]
pub struct PageFetch {
    pub success: bool,
    /// Anchors in document order
    pub links: Vec<Anchor>,
    pub error: Option<String>,
}

impl PageFetch {
    pub fn ok(links: Vec<Anchor>) -> Self {
        Self {
            success: true,
            links,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            links: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Per-URL result of a batch fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Raw page content
    Fetched { content: String },
    Failed { error: String },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Fetched { .. })
    }
}

/// Fetches one page and reports the links on it
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str, config: &FetchConfig) -> Result<PageFetch>;
}

/// Fetches many pages in one call
///
/// Implementations must return exactly one outcome per input URL, in input
/// order. They are free to fetch concurrently.
#[async_trait]
pub trait BatchFetcher: Send + Sync {
    async fn batch_fetch(&self, urls: &[String], config: &FetchConfig) -> Vec<FetchOutcome>;

    /// Prepares a reusable session shared by the fetches of one run
    async fn open_session(&self, _session_id: &str) -> Result<()> {
        Ok(())
    }

    /// Releases a session opened with [`open_session`](Self::open_session)
    fn release_session(&self, _session_id: &str) {}
}

/// Keeps a fetch session open for as long as it lives
///
/// Dropping the guard releases the session, so every exit path of a run
/// (success, error, interrupt) gives it back.
pub struct SessionGuard {
    fetcher: Arc<dyn BatchFetcher>,
    session_id: String,
}

impl SessionGuard {
    /// Opens `session_id` on `fetcher` and returns the guard holding it
    pub async fn open(fetcher: Arc<dyn BatchFetcher>, session_id: &str) -> Result<Self> {
        fetcher.open_session(session_id).await?;
        tracing::debug!("Opened fetch session {}", session_id);

        Ok(Self {
            fetcher,
            session_id: session_id.to_string(),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.fetcher.release_session(&self.session_id);
        tracing::debug!("Released fetch session {}", self.session_id);
    }
}
