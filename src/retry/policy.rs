//! Attempt budgets and the generic retry wrapper

use super::classify::{is_retryable, retry_delay, ErrorKind};
use crate::{NetworkError, Result, ScribeError};
use std::future::Future;

/// Policy for page fetches and discovery
pub const FETCH_POLICY: RetryPolicy = RetryPolicy::new("fetch", 4, &[ErrorKind::Network]);

/// Policy for transform calls, which are costlier to lose
///
/// Transform collaborators talk to a remote model, so transient network
/// failures are retried here too.
pub const TRANSFORM_POLICY: RetryPolicy = RetryPolicy::new(
    "transform",
    5,
    &[ErrorKind::Transform, ErrorKind::RateLimit, ErrorKind::Network],
);

/// How many attempts an operation gets, and which error kinds may be retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    name: &'static str,
    max_attempts: u32,
    retry_on: &'static [ErrorKind],
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` includes the first attempt and is at least 1
    pub const fn new(name: &'static str, max_attempts: u32, retry_on: &'static [ErrorKind]) -> Self {
        Self {
            name,
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            retry_on,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// True if the error kind is covered by this policy and the error itself
    /// is classified as retryable
    pub fn should_retry(&self, error: &ScribeError) -> bool {
        self.retry_on.contains(&error.kind()) && is_retryable(error)
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// the attempt budget of `policy` is spent
///
/// The final error is returned as the operation produced it, with one
/// exception: a network error whose `retry_count`/`max_retries` are still at
/// their defaults gets the attempt bookkeeping of this loop written into
/// them, so its backoff grows as 1s, 2s, 4s, ... across attempts. Values set
/// by the collaborator are left alone.
pub async fn retry_with_policy<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;

    loop {
        let mut error = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if let ScribeError::Network(network) = &mut error {
            if network.retry_count == 0 && network.max_retries == NetworkError::DEFAULT_MAX_RETRIES {
                network.retry_count = attempt - 1;
                network.max_retries = policy.max_attempts - 1;
            }
        }

        if attempt >= policy.max_attempts {
            tracing::warn!(
                "{} failed after {} attempts: {}",
                policy.name,
                attempt,
                error
            );
            return Err(error);
        }

        if !policy.should_retry(&error) {
            tracing::debug!(
                "{} error is not retryable ({}): {}",
                policy.name,
                error.kind(),
                error
            );
            return Err(error);
        }

        let delay = retry_delay(&error);
        tracing::warn!(
            "{} attempt {}/{} failed ({}), retrying in {:?}: {}",
            policy.name,
            attempt,
            policy.max_attempts,
            error.kind(),
            delay,
            error
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
