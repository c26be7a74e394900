//! Batch pipeline
//!
//! Drives an ordered URL list through fetch, transform, link normalization and
//! persistence, one item at a time, and folds the results into a
//! [`BatchSummary`].
//!
//! Failure handling per item:
//!
//! | Step | Failure | Recorded reason |
//! |------|---------|-----------------|
//! | Fetch | collaborator error | the error text |
//! | Content check | shorter than `min-content-length` | `empty content` |
//! | Transform | error after retries | the error text |
//! | Transform | empty output | `transform returned no content` |
//! | Persist | write error | the error text |
//!
//! Configuration errors and broken collaborator contracts abort the whole
//! run instead.

mod item;
mod orchestrator;
mod shutdown;
mod summary;

pub use item::{ItemState, ProcessingItem};
pub use orchestrator::{process_batch, Orchestrator, EMPTY_CONTENT, EMPTY_TRANSFORM};
pub use shutdown::ShutdownSignal;
pub use summary::{BatchSummary, FailedItem, ItemOutcome, ItemReport};
