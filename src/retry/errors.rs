//! Typed error variants that carry retry information
//!
//! Each error records the URL it originated from (when known), typed context
//! fields, and an optional wrapped cause exposed through `Error::source`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Boxed cause attached to an error
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Markers in a transform error message that mean the input itself is the
/// problem (context window, token or size limit). Such errors are permanent.
const PERMANENT_TRANSFORM_MARKERS: &[&str] = &[
    "context",
    "token limit",
    "too many tokens",
    "too large",
    "size limit",
];

/// Network failure while talking to an origin
#[derive(Debug, Error)]
#[error("{message}")]
pub struct NetworkError {
    pub message: String,
    pub url: Option<String>,
    pub status_code: Option<u16>,
    pub retry_count: u32,
    pub max_retries: u32,
    #[source]
    pub source: Option<BoxError>,
}

impl NetworkError {
    /// Default number of retries allowed after the first attempt
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Upper bound on the exponential backoff, in seconds
    pub const MAX_DELAY_SECS: u64 = 60;

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            url: None,
            status_code: None,
            retry_count: 0,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            source: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_retries(mut self, retry_count: u32, max_retries: u32) -> Self {
        self.retry_count = retry_count;
        self.max_retries = max_retries;
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// True while the retry budget is not exhausted
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }

    /// Exponential backoff: `min(2^retry_count, 60)` seconds
    pub fn retry_delay(&self) -> Duration {
        let secs = 2u64
            .checked_pow(self.retry_count)
            .unwrap_or(u64::MAX)
            .min(Self::MAX_DELAY_SECS);
        Duration::from_secs(secs)
    }
}

/// Failure of the content transformation step
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransformError {
    pub message: String,
    pub url: Option<String>,
    pub model: Option<String>,
    pub provider: Option<String>,
    #[source]
    pub source: Option<BoxError>,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            url: None,
            model: None,
            provider: None,
            source: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// True when the message points at a semantic or size limit of the input
    pub fn is_permanent(&self) -> bool {
        let message = self.message.to_lowercase();
        PERMANENT_TRANSFORM_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    }
}

/// The transform provider asked us to slow down
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RateLimitError {
    pub message: String,
    pub url: Option<String>,
    /// Explicit wait hint from the provider, in seconds
    pub retry_after: Option<u64>,
    pub provider: Option<String>,
    #[source]
    pub source: Option<BoxError>,
}

impl RateLimitError {
    /// Wait used for OpenRouter when it gives no hint
    pub const OPENROUTER_WAIT_SECS: u64 = 60;

    /// Wait used when neither a hint nor a known provider is available
    pub const DEFAULT_WAIT_SECS: u64 = 30;

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            url: None,
            retry_after: None,
            provider: None,
            source: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Recommended wait before the next attempt
    pub fn wait_time(&self) -> Duration {
        if let Some(seconds) = self.retry_after.filter(|s| *s > 0) {
            return Duration::from_secs(seconds);
        }

        let is_openrouter = self
            .provider
            .as_deref()
            .is_some_and(|p| p.to_lowercase().contains("openrouter"));

        if is_openrouter {
            Duration::from_secs(Self::OPENROUTER_WAIT_SECS)
        } else {
            Duration::from_secs(Self::DEFAULT_WAIT_SECS)
        }
    }
}

/// File operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOperation {
    Read,
    Write,
    Create,
}

impl fmt::Display for PersistOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Create => "create",
        };
        write!(f, "{}", name)
    }
}

/// Failure reading or writing a local file
#[derive(Debug, Error)]
#[error("{message} ({})", path.display())]
pub struct PersistError {
    pub message: String,
    pub path: PathBuf,
    pub operation: PersistOperation,
    #[source]
    pub source: Option<std::io::Error>,
}

impl PersistError {
    pub fn new(message: impl Into<String>, path: &Path, operation: PersistOperation) -> Self {
        Self {
            message: message.into(),
            path: path.to_path_buf(),
            operation,
            source: None,
        }
    }

    /// Wraps an I/O error raised while performing `operation` on `path`
    pub fn from_io(error: std::io::Error, path: &Path, operation: PersistOperation) -> Self {
        Self {
            message: format!("Failed to {} file: {}", operation, error),
            path: path.to_path_buf(),
            operation,
            source: Some(error),
        }
    }

    pub fn is_permission_error(&self) -> bool {
        match &self.source {
            Some(e) => e.kind() == std::io::ErrorKind::PermissionDenied,
            None => self.message.to_lowercase().contains("permission"),
        }
    }

    pub fn is_not_found(&self) -> bool {
        match &self.source {
            Some(e) => e.kind() == std::io::ErrorKind::NotFound,
            None => self.message.to_lowercase().contains("not found"),
        }
    }
}
