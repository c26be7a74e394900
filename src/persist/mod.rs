//! Artifact persistence
//!
//! Writes are plain UTF-8 file writes. Creating the output directory is the
//! caller's job; a missing directory surfaces as a [`PersistError`].

use crate::retry::PersistOperation;
use crate::PersistError;
use async_trait::async_trait;
use std::path::Path;

/// Writes a finished document to `path`
#[async_trait]
pub trait Persister: Send + Sync {
    async fn persist(&self, path: &Path, content: &str) -> Result<(), PersistError>;
}

/// Filesystem persister backed by `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPersister;

#[async_trait]
impl Persister for FsPersister {
    async fn persist(&self, path: &Path, content: &str) -> Result<(), PersistError> {
        tokio::fs::write(path, content)
            .await
            .map_err(|e| PersistError::from_io(e, path, PersistOperation::Write))?;

        tracing::debug!("Wrote {} ({} chars)", path.display(), content.chars().count());
        Ok(())
    }
}
