use snafu::{Snafu, ResultExt};

use crate::refresh::BoardState;
use crate::source::{RefreshError, SnapshotSource};

#[derive(Snafu, Debug)]
pub enum InitialLoadError {
    #[snafu(display("Snapshot endpoint at '{}' is unavailable: {}", url, source))]
    Unavailable {
        url: String,
        source: RefreshError,
    },
}

/// Fetches the first snapshot. Nothing is drawn from a failed load; the
/// caller decides what to show instead.
pub async fn load_initial(source: &dyn SnapshotSource, url: &str) -> Result<BoardState, InitialLoadError> {
    let coins = source.fetch_snapshot().await
        .context(Unavailable { url })?;

    info!("Loaded {} coins from '{}'", coins.len(), url);
    Ok(BoardState::seeded(coins))
}
