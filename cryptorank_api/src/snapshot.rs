use snafu::{Snafu, ResultExt};

use cryptorank_data::{FetchError, MarketSource};
use cryptorank_domain::Snapshot;
use crate::convert::to_snapshot;

#[derive(Snafu, Debug)]
pub enum SnapshotError {
    #[snafu(display("Upstream rate limit exceeded"))]
    RateLimited,

    #[snafu(display("Failed to fetch markets from upstream: {}", source))]
    UpstreamError {
        source: FetchError,
    },

    #[snafu(display("Failed to encode snapshot: {}", source))]
    EndpointError {
        source: serde_json::Error,
    },
}

impl From<FetchError> for SnapshotError {
    fn from(e: FetchError) -> Self {
        if e.is_rate_limited() {
            SnapshotError::RateLimited
        } else {
            SnapshotError::UpstreamError { source: e }
        }
    }
}

/// Builds a fresh snapshot from whatever `source` currently holds.
pub async fn take_snapshot(source: &dyn MarketSource) -> Result<Snapshot, SnapshotError> {
    let markets = source.fetch_markets().await?;
    Ok(to_snapshot(&markets))
}

/// The response body for `GET /api/crypto`.
pub async fn take_snapshot_json(source: &dyn MarketSource) -> Result<Vec<u8>, SnapshotError> {
    let snapshot = take_snapshot(source).await?;
    serde_json::to_vec(&snapshot).context(EndpointError)
}
