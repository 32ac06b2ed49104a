//! Snapshot sources.
//!
//! Every source honours one contract: a poll yields a fully parsed
//! [`Snapshot`] or `None`. Transport, status and parse failures are logged at
//! debug level and never reach the scheduler.

mod file;
mod http;

use std::path::PathBuf;

use fray_types::{FeedSettings, Snapshot};
use thiserror::Error;

pub use file::FileSource;
pub use http::HttpSource;

/// Something the scheduler can poll for the latest combat state.
pub trait SnapshotSource {
    /// One fetch attempt. `None` on any failure; no retries.
    fn poll(&mut self) -> impl Future<Output = Option<Snapshot>> + Send;
}

/// Why a fetch produced no snapshot. Internal to the sources.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Decode a snapshot document.
pub fn parse_snapshot(bytes: &[u8]) -> Result<Snapshot, SourceError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Source picked from the configured feed location.
#[derive(Debug, Clone)]
pub enum FeedSource {
    Http(HttpSource),
    File(FileSource),
}

impl FeedSource {
    /// `http://` and `https://` locations are fetched, anything else is read from disk.
    pub fn from_settings(settings: &FeedSettings) -> Self {
        if settings.is_remote() {
            Self::Http(HttpSource::new(&settings.location))
        } else {
            Self::File(FileSource::new(&settings.location))
        }
    }

    /// Human-readable location, for logs.
    pub fn location(&self) -> String {
        match self {
            Self::Http(s) => s.url().to_string(),
            Self::File(s) => s.path().display().to_string(),
        }
    }
}

impl SnapshotSource for FeedSource {
    async fn poll(&mut self) -> Option<Snapshot> {
        match self {
            Self::Http(s) => s.poll().await,
            Self::File(s) => s.poll().await,
        }
    }
}
