/// Item state definitions for tracking a URL through one pass of the pipeline
///
/// Every item moves forward only: no state is revisited and a failed item is
/// never retried as a whole (retries happen inside single steps).
use crate::{Result, ScribeError};
use std::fmt;

/// Represents the current state of an item in the batch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    // ===== Active States =====
    /// Item has been created, fetch result not yet looked at
    Pending,

    /// Raw content is available
    Fetched,

    /// Content passed the minimum length check
    ContentOk,

    /// Transform produced a document
    Transformed,

    // ===== Terminal Success State =====
    /// Document was written to disk
    Saved,

    // ===== Terminal Error States =====
    /// Batch fetch reported an error for this URL
    FetchFailed,

    /// Content was missing or shorter than the minimum length
    ContentEmpty,

    /// Transform failed or returned nothing
    TransformFailed,

    /// Document could not be written
    SaveFailed,
}

impl ItemState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Self::Pending | Self::Fetched | Self::ContentOk | Self::Transformed
        )
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Saved)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: ItemState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Fetched | Self::FetchFailed)
                | (Self::Fetched, Self::ContentOk | Self::ContentEmpty)
                | (Self::ContentOk, Self::Transformed | Self::TransformFailed)
                | (Self::Transformed, Self::Saved | Self::SaveFailed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetched => "fetched",
            Self::ContentOk => "content_ok",
            Self::Transformed => "transformed",
            Self::Saved => "saved",
            Self::FetchFailed => "fetch_failed",
            Self::ContentEmpty => "content_empty",
            Self::TransformFailed => "transform_failed",
            Self::SaveFailed => "save_failed",
        }
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One URL on its way through the pipeline; lives for a single loop iteration
#[derive(Debug, Clone)]
pub struct ProcessingItem {
    pub url: String,
    /// 1-based position used for the output file name
    pub index: usize,
    pub content: Option<String>,
    pub transformed: Option<String>,
    state: ItemState,
}

impl ProcessingItem {
    pub fn new(url: impl Into<String>, index: usize) -> Self {
        Self {
            url: url.into(),
            index,
            content: None,
            transformed: None,
            state: ItemState::Pending,
        }
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    /// Moves the item to `next`
    ///
    /// # Errors
    ///
    /// `ScribeError::InvalidTransition` if `next` does not follow the current
    /// state; the item is left unchanged.
    pub fn advance(&mut self, next: ItemState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(ScribeError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::trace!("{}: {} -> {}", self.url, self.state, next);
        self.state = next;
        Ok(())
    }
}
