//! Cache-bypassing HTTP GET of the snapshot document.

use fray_types::Snapshot;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use tracing::debug;

use super::{SnapshotSource, SourceError, parse_snapshot};

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Use a preconfigured client (proxy, timeouts, TLS).
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One GET, with the error kept.
    pub async fn fetch(&self) -> Result<Snapshot, SourceError> {
        let transport = |source: reqwest::Error| SourceError::Transport {
            url: self.url.clone(),
            source,
        };

        let response = self
            .client
            .get(&self.url)
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        parse_snapshot(&body)
    }
}

impl SnapshotSource for HttpSource {
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
