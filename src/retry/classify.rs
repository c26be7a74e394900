//! Retryability and backoff classification
//!
//! Typed errors are classified by variant. Collaborators that can only report
//! a message string go through the keyword fallback in [`classify_message`].

use crate::{NetworkError, ScribeError, UrlError};
use std::fmt;
use std::time::Duration;

/// Wait used for retryable errors without their own backoff rule
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Message fragments that point at a broken URL rather than a broken network
const URL_ERROR_TERMS: &[&str] = &[
    "invalid", "malformed", "domain", "parse", "scheme", "url", "format", "hostname", "path",
    "query",
];

/// Message fragments of network failures that will not heal on retry
const PERMANENT_NETWORK_TERMS: &[&str] = &[
    "404",
    "not found",
    "forbidden",
    "unauthorized",
    "certificate",
    "ssl",
    "dns",
    "host not found",
];

/// Taxonomy bucket of a [`ScribeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Url,
    Network,
    Transform,
    RateLimit,
    Persist,
    Config,
    /// Broken preconditions inside the pipeline itself
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Network => "network",
            Self::Transform => "transform",
            Self::RateLimit => "rate_limit",
            Self::Persist => "persist",
            Self::Config => "config",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns true if `error` may succeed when the operation is attempted again
pub fn is_retryable(error: &ScribeError) -> bool {
    match error {
        ScribeError::Network(e) => e.can_retry(),
        ScribeError::RateLimit(_) => true,
        ScribeError::Transform(e) => !e.is_permanent(),
        _ => false,
    }
}

/// How long to wait before retrying after `error`
pub fn retry_delay(error: &ScribeError) -> Duration {
    match error {
        ScribeError::Network(e) => e.retry_delay(),
        ScribeError::RateLimit(e) => e.wait_time(),
        _ => DEFAULT_RETRY_DELAY,
    }
}

/// Result of classifying a bare error message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    Url,
    Network,
}

/// Classifies an error message by keyword
///
/// URL terms are checked first since they are more specific. Anything that
/// is not recognisably a URL problem is treated as a network problem.
pub fn classify_message(message: &str) -> MessageClass {
    let lower = message.to_lowercase();

    if URL_ERROR_TERMS.iter().any(|term| lower.contains(term)) {
        MessageClass::Url
    } else {
        MessageClass::Network
    }
}

/// Builds a typed error for a collaborator failure that only carries a message
///
/// Network messages that [`should_retry_message`] rejects ("404", "dns", ...)
/// become network errors with an exhausted retry budget, so they fail fast.
pub fn error_from_message(message: &str, url: &str) -> ScribeError {
    match classify_message(message) {
        MessageClass::Url => UrlError::Malformed {
            url: url.to_string(),
            reason: message.to_string(),
        }
        .into(),
        MessageClass::Network if !should_retry_message(message) => NetworkError::new(message)
            .with_url(url)
            .with_retries(0, 0)
            .into(),
        MessageClass::Network => NetworkError::new(message).with_url(url).into(),
    }
}

/// Stricter message check that also rules out permanent network failures
pub fn should_retry_message(message: &str) -> bool {
    if classify_message(message) == MessageClass::Url {
        return false;
    }

    let lower = message.to_lowercase();
    !PERMANENT_NETWORK_TERMS.iter().any(|term| lower.contains(term))
}
