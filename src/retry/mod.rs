//! Error classification and retry engine
//!
//! This module answers two separate questions:
//! - is this error worth retrying, and after how long? ([`is_retryable`], [`retry_delay`])
//! - how many attempts does an operation get, and for which error kinds? ([`RetryPolicy`])
//!
//! | Error kind | Retryable | Wait |
//! |------------|-----------|------|
//! | Url | no | - |
//! | Network | while `retry_count < max_retries` | `min(2^retry_count, 60)`s |
//! | Transform (generic) | yes | 1s |
//! | Transform (context/size limit) | no | - |
//! | RateLimit | yes | hint, else provider default, else 30s |
//! | Persist | no | - |
//! | Config | no, fatal | - |

mod classify;
mod errors;
mod policy;

pub use classify::{
    classify_message, error_from_message, is_retryable, retry_delay, should_retry_message,
    ErrorKind, MessageClass, DEFAULT_RETRY_DELAY,
};
pub use errors::{
    BoxError, NetworkError, PersistError, PersistOperation, RateLimitError, TransformError,
};
pub use policy::{retry_with_policy, RetryPolicy, FETCH_POLICY, TRANSFORM_POLICY};
