//! Scroll-Scribe: turns documentation sites into clean text artifacts
//!
//! This crate discovers the pages linked from a start page, fetches them in one
//! batch, transforms each page into a clean document, rewrites its links to
//! absolute form and writes it to disk. Individual failures are classified,
//! retried where that makes sense, and folded into a per-run summary.

pub mod config;
pub mod discovery;
pub mod fetch;
pub mod normalize;
pub mod output;
pub mod persist;
pub mod pipeline;
pub mod retry;
pub mod transform;

use thiserror::Error;

pub use retry::{NetworkError, PersistError, RateLimitError, TransformError};

/// Main error type for Scroll-Scribe operations
#[derive(Debug, Error)]
pub enum ScribeError {
    #[error(transparent)]
    Url(#[from] UrlError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    RateLimit(#[from] RateLimitError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Batch fetch returned {actual} results for {expected} URLs")]
    FetchCountMismatch { expected: usize, actual: usize },

    #[error("Invalid item state transition: {from} -> {to}")]
    InvalidTransition {
        from: pipeline::ItemState,
        to: pipeline::ItemState,
    },
}

impl ScribeError {
    /// Returns the taxonomy bucket this error belongs to
    pub fn kind(&self) -> retry::ErrorKind {
        use retry::ErrorKind;

        match self {
            Self::Url(_) => ErrorKind::Url,
            Self::Network(_) => ErrorKind::Network,
            Self::Transform(_) => ErrorKind::Transform,
            Self::RateLimit(_) => ErrorKind::RateLimit,
            Self::Persist(_) => ErrorKind::Persist,
            Self::Config(_) => ErrorKind::Config,
            Self::FetchCountMismatch { .. } | Self::InvalidTransition { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Returns the URL the error originated from, when it is known
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(e) => Some(e.url()),
            Self::Network(e) => e.url.as_deref(),
            Self::Transform(e) => e.url.as_deref(),
            Self::RateLimit(e) => e.url.as_deref(),
            Self::Persist(_)
            | Self::Config(_)
            | Self::FetchCountMismatch { .. }
            | Self::InvalidTransition { .. } => None,
        }
    }

    /// Returns true if this error must abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::FetchCountMismatch { .. } | Self::InvalidTransition { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing credential: environment variable {key} is not set")]
    MissingCredential { key: String },
}

impl ConfigError {
    /// Returns the error message together with a suggested fix, if one is known
    pub fn help_message(&self) -> String {
        match self {
            Self::MissingCredential { key } => {
                format!("{}\nSuggested fix: export {}=your_api_key", self, key)
            }
            _ => self.to_string(),
        }
    }
}

/// URL-specific errors
///
/// These are permanent: retrying a malformed URL cannot make it valid.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("Invalid URL scheme for {url}: {scheme}")]
    InvalidScheme { url: String, scheme: String },

    #[error("Missing host in URL: {url}")]
    MissingHost { url: String },

    #[error("Could not process URL {url}: {reason}")]
    Malformed { url: String, reason: String },
}

impl UrlError {
    /// The offending URL
    pub fn url(&self) -> &str {
        match self {
            Self::Parse { url, .. }
            | Self::InvalidScheme { url, .. }
            | Self::MissingHost { url }
            | Self::Malformed { url, .. } => url,
        }
    }
}

/// Result type alias for Scroll-Scribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::ScribeConfig;
pub use discovery::LinkDiscoverer;
pub use normalize::{absolutify, name_for};
pub use pipeline::{process_batch, BatchSummary, Orchestrator};
