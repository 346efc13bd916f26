//! Canonical snapshot and trend history for one dashboard session.
//!
//! Fetches run as spawned tasks and report back through the completion
//! channel returned by [`SyncEngine::new`]. The owning event loop feeds each
//! completion to [`SyncEngine::apply`], which is the only place state changes.
//! Every trigger gets a sequence number; a snapshot whose sequence is lower
//! than the last applied one is a stale completion and is dropped.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::SnapshotSource;
use super::error::FetchError;
use super::history::TrendHistory;
use crate::models::ResultSnapshot;

/// Result of one fetch, tagged with the sequence number of its trigger.
#[derive(Debug)]
pub struct FetchCompletion {
    pub seq: u64,
    pub outcome: Result<Option<ResultSnapshot>, FetchError>,
}

/// What `apply` did with a completion.
#[derive(Debug)]
pub enum ApplyOutcome {
    Applied,
    NoData,
    Failed(FetchError),
    Stale { seq: u64, last_applied: u64 },
    Detached,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub applied: u64,
    pub stale: u64,
    pub empty: u64,
    pub failed: u64,
}

pub struct SyncEngine {
    source: Arc<dyn SnapshotSource>,
    completion_tx: mpsc::UnboundedSender<FetchCompletion>,
    current: Option<Arc<ResultSnapshot>>,
    history: TrendHistory,
    next_seq: u64,
    last_applied: Option<u64>,
    in_flight: usize,
    stats: SyncStats,
    observers: watch::Sender<Option<Arc<ResultSnapshot>>>,
    disposed: bool,
}

impl SyncEngine {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
    ) -> (Self, mpsc::UnboundedReceiver<FetchCompletion>) {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (observers, _) = watch::channel(None);
        let engine = Self {
            source,
            completion_tx,
            current: None,
            history: TrendHistory::new(),
            next_seq: 1,
            last_applied: None,
            in_flight: 0,
            stats: SyncStats::default(),
            observers,
            disposed: false,
        };
        (engine, completion_rx)
    }

    /// Start a fetch for a new trigger. Returns the trigger's sequence number,
    /// or `None` once the engine has been disposed.
    pub fn on_trigger(&mut self) -> Option<u64> {
        if self.disposed {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight += 1;

        let source = Arc::clone(&self.source);
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let outcome = source.fetch().await;
            // Receiver gone means the session was torn down.
            let _ = tx.send(FetchCompletion { seq, outcome });
        });
        debug!(seq, "fetch started");
        Some(seq)
    }

    /// Apply a finished fetch. Must be called from the loop that owns the engine.
    pub fn apply(&mut self, completion: FetchCompletion) -> ApplyOutcome {
        let FetchCompletion { seq, outcome } = completion;
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.disposed {
            debug!(seq, "dropping completion for disposed engine");
            return ApplyOutcome::Detached;
        }

        match outcome {
            Err(e) => {
                warn!(seq, error = %e, "fetch failed");
                self.stats.failed += 1;
                ApplyOutcome::Failed(e)
            }
            Ok(None) => {
                debug!(seq, "no result available yet");
                self.stats.empty += 1;
                ApplyOutcome::NoData
            }
            Ok(Some(snapshot)) => {
                if let Some(last_applied) = self.last_applied
                    && seq < last_applied
                {
                    debug!(seq, last_applied, "discarding stale completion");
                    self.stats.stale += 1;
                    return ApplyOutcome::Stale { seq, last_applied };
                }
                self.replace(seq, snapshot);
                ApplyOutcome::Applied
            }
        }
    }

    fn replace(&mut self, seq: u64, snapshot: ResultSnapshot) {
        info!(
            seq,
            total = snapshot.total_tests,
            passed = snapshot.passed_tests,
            failed = snapshot.failed_tests,
            "applied new result"
        );
        self.history.push(snapshot.trend_point());
        let snapshot = Arc::new(snapshot);
        self.current = Some(Arc::clone(&snapshot));
        self.last_applied = Some(seq);
        self.stats.applied += 1;
        self.observers.send_replace(Some(snapshot));
    }

    /// The snapshot on display, `None` until the first one arrives.
    pub fn current(&self) -> Option<&ResultSnapshot> {
        self.current.as_deref()
    }

    /// Trend points, oldest first.
    pub fn history(&self) -> &TrendHistory {
        &self.history
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight > 0
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Watch the applied snapshot from elsewhere in the session.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<ResultSnapshot>>> {
        self.observers.subscribe()
    }

    /// Detach the engine. Fetches still in flight may finish, but nothing they
    /// return is applied.
    pub fn dispose(&mut self) {
        if !self.disposed {
            info!(in_flight = self.in_flight, "sync engine disposed");
        }
        self.disposed = true;
    }
}
