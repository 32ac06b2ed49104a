//! Snapshot document written to disk by the producer.

use std::path::{Path, PathBuf};

use fray_types::Snapshot;
use tracing::debug;

use super::{SnapshotSource, SourceError, parse_snapshot};

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn fetch(&self) -> Result<Snapshot, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        parse_snapshot(&bytes)
    }
}

impl SnapshotSource for FileSource {
    async fn poll(&mut self) -> Option<Snapshot> {
        match self.fetch().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!(error = %e, "snapshot poll failed");
                None
            }
        }
    }
}
