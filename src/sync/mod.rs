pub mod engine;
pub mod error;
pub mod fetcher;
pub mod history;
pub mod listener;
#[cfg(test)]
mod test_support;

use async_trait::async_trait;

use crate::models::ResultSnapshot;

pub use engine::{ApplyOutcome, FetchCompletion, SyncEngine, SyncStats};
pub use error::{FetchError, StreamError};
pub use fetcher::HttpFetcher;
pub use history::TrendHistory;
pub use listener::{ListenerHandle, ListenerSignal, NotificationListener};

/// Where the engine reads snapshots from.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Read the latest snapshot. `Ok(None)` means no run has been published yet.
    async fn fetch(&self) -> Result<Option<ResultSnapshot>, FetchError>;
}
