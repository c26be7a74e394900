//! Content transformation
//!
//! A [`Transformer`] turns raw page content into a clean document. Transforms
//! are blocking calls; the pipeline runs them through a [`BlockingWorker`].

mod markdown;
mod worker;

pub use markdown::MarkdownTransformer;
pub use worker::BlockingWorker;

use crate::Result;
use std::sync::Arc;

/// Separator placed between chunks of a chunked transform result
pub const CHUNK_SEPARATOR: &str = "\n\n---\n\n";

/// What a transformer produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutput {
    Text(String),
    /// Partial documents, in order
    Chunks(Vec<String>),
}

impl TransformOutput {
    /// Flattens the output into one document
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Chunks(chunks) => chunks.join(CHUNK_SEPARATOR),
        }
    }
}

/// Blocking content transform
pub trait Transformer: Send + Sync {
    fn transform(&self, content: &str) -> Result<TransformOutput>;
}

/// Runs one transform attempt on `worker` and flattens the result
pub async fn offload_transform(
    worker: &BlockingWorker,
    transformer: Arc<dyn Transformer>,
    content: Arc<str>,
) -> Result<String> {
    worker
        .run(move || transformer.transform(&content).map(TransformOutput::into_text))
        .await
}
