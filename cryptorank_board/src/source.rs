use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use snafu::{Snafu, ResultExt};
use tokio::time::Duration;

use cryptorank_domain::Snapshot;

/// Shown when the server gave us nothing better to say.
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to fetch data";

#[derive(Snafu, Debug)]
pub enum RefreshError {
    #[snafu(display("Snapshot endpoint responded with HTTP {}: {}", status, message))]
    Server {
        status: u16,
        message: String,
    },

    #[snafu(display("Failed to reach snapshot endpoint: {}", source))]
    Transport {
        source: reqwest::Error,
    },

    #[snafu(display("Failed to decode snapshot: {}", source))]
    Decode {
        source: serde_json::Error,
    },
}

impl RefreshError {
    /// The text for the error banner: the server's own message when it sent
    /// one, otherwise a generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            RefreshError::Server { message, .. } => message.clone(),
            RefreshError::Transport { .. }
            | RefreshError::Decode { .. } => FALLBACK_ERROR_MESSAGE.to_owned(),
        }
    }
}

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Snapshot, RefreshError>;
}

pub type SnapshotSourceRef = Arc<dyn SnapshotSource>;

/// Reads snapshots from a running `cryptorank_api` at `GET <base>/api/crypto`.
pub struct HttpSnapshotSource {
    http: reqwest::Client,
    url: String,
}

impl HttpSnapshotSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<HttpSnapshotSource, RefreshError> {
        let http = reqwest::ClientBuilder::new()
            .timeout(timeout)
            .gzip(true)
            .build()
            .context(Transport)?;

        Ok(HttpSnapshotSource {
            http,
            url: snapshot_url(base_url),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn snapshot_url(base_url: &str) -> String {
    format!("{}/api/crypto", base_url.trim_end_matches('/'))
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

fn error_message_of(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body).ok()
        .and_then(|b| b.error)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_owned())
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch_snapshot(&self) -> Result<Snapshot, RefreshError> {
        let response = self.http
            .get(&self.url)
            .send()
            .await
            .context(Transport)?;

        let status = response.status();
        let buffer = response.bytes().await.context(Transport)?;

        if !status.is_success() {
            return Server {
                status: status.as_u16(),
                message: error_message_of(&buffer),
            }.fail();
        }

        serde_json::from_slice::<Snapshot>(&buffer).context(Decode)
    }
}
